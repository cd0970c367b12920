use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gitmetrics")]
#[command(about = "Git contribution metrics per author, branch and environment")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    #[arg(long, short = 'p', global = true, help = "Path to git repository (defaults to the current directory)")]
    pub repo: Option<PathBuf>,

    #[arg(long, global = true, env = "GITMETRICS_CONFIG", help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long = "author", short = 'a', global = true, help = "Author email to include; repeat for several (partial name/email is matched as a fallback)")]
    pub authors: Vec<String>,

    #[arg(long, global = true, help = "Include every author when no --author is given")]
    pub all_authors: bool,

    #[arg(long, global = true, help = "Start from this commit or date (RFC3339, YYYY-MM-DD, \"<n> <unit> ago\", or a git revision)")]
    pub since: Option<String>,

    #[arg(long, global = true, help = "End at this commit or date (RFC3339, YYYY-MM-DD, \"<n> <unit> ago\", or a git revision)")]
    pub until: Option<String>,

    #[arg(long = "production-branch", global = true, help = "Branch name treated as production; repeat for several (default: main, master)")]
    pub production_branches: Vec<String>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only log errors")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse the repository and write the reports
    Analyze {
        #[arg(long, help = "Print the metrics document as JSON instead of the summary")]
        json: bool,

        #[arg(long, help = "Also write the metrics document as a JSON file next to the spreadsheet")]
        export_json: bool,

        #[arg(long, help = "Directory for generated reports")]
        reports_dir: Option<PathBuf>,

        #[arg(long, help = "Do not write the spreadsheet")]
        no_xlsx: bool,
    },
    /// List the authors found on local branches
    Authors {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Check that the path is a readable git repository
    Check,
    /// Copy a generated report into a directory
    Save {
        #[arg(long, help = "Report file to copy")]
        report: PathBuf,

        #[arg(long, help = "Destination directory (created when missing)")]
        dest: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::logging::init(self.common.verbose, self.common.quiet);

        match self.command {
            Commands::Analyze {
                json,
                export_json,
                reports_dir,
                no_xlsx,
            } => crate::analyze::exec(
                self.common,
                crate::analyze::Outputs {
                    json,
                    export_json,
                    reports_dir,
                    xlsx: !no_xlsx,
                },
            ),
            Commands::Authors { json } => crate::authors::exec(self.common, json),
            Commands::Check => crate::check::exec(self.common),
            Commands::Save { report, dest } => crate::save::exec(&report, &dest),
        }
    }
}
