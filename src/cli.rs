use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "jar-verify")]
#[command(about = "Check jar artifacts for duplicate entries and summarize their public API size")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extra jar searched when resolving supertypes; repeatable.
    #[arg(long = "classpath", value_name = "JAR", global = true)]
    pub classpath: Vec<PathBuf>,

    /// JDK whose class files resolve platform supertypes; defaults to $JAVA_HOME.
    #[arg(long = "java-home", value_name = "DIR", global = true)]
    pub java_home: Option<PathBuf>,

    /// Suppress progress lines on stderr.
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Verify artifacts (files, or directories searched with --pattern).
    Verify {
        #[arg(value_name = "TARGET")]
        targets: Vec<PathBuf>,

        #[arg(short = 'p', long, value_name = "GLOB")]
        pattern: Option<String>,

        #[arg(short = 'r', long)]
        recursive: bool,

        #[arg(short = 't', long, value_name = "N")]
        top: Option<usize>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show the public methods one class resolves to.
    Methods {
        jar_path: PathBuf,

        class_name: String,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
