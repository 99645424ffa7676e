use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bb19prep",
    version,
    about = "Convert BioNLP standoff annotations into word-aligned JSON Lines"
)]
pub struct Cli {
    #[arg(long, value_enum)]
    pub token: SplitToken,

    #[arg(long = "input_dir", alias = "input-dir")]
    pub input_dir: PathBuf,

    #[arg(long = "output_dir", alias = "output-dir")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = 250)]
    pub max_sentence_tokens: usize,

    #[arg(long, value_enum, default_value_t = OutOfRangePolicy::Keep)]
    pub out_of_range: OutOfRangePolicy,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SplitToken {
    Train,
    Dev,
}

impl SplitToken {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Dev => "dev",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutOfRangePolicy {
    Keep,
    Drop,
}

impl OutOfRangePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Drop => "drop",
        }
    }
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.token.as_str()))
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("process_bb19_{}.log", self.token.as_str()))
    }
}
