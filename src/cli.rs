use clap::Parser;

/// 🔧 Group uncommitted changes by the branch commit that last touched them
#[derive(Debug, Parser)]
#[command(
    name = "git-fixupper",
    version,
    about = "🔧 Group uncommitted changes by the commit they belong to, then fix them up",
    long_about = None
)]
pub struct Cli {
    /// 📁 Path inside the Git repo
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// 🩹 Create a fixup commit per group (asks for confirmation)
    #[arg(long, conflicts_with = "json")]
    pub fixup: bool,

    /// Print the grouping as JSON
    #[arg(long)]
    pub json: bool,

    /// 🔢 How many recent commits to scan for the branch start
    #[arg(
        short,
        long,
        default_value = "100",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub limit: usize,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
