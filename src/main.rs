use anyhow::{Context, Result};
use clap::Parser;
use jar_verify::cli::{Cli, Commands, OutputFormat};
use jar_verify::archive::Archive;
use jar_verify::config::{
    resolve_classpath, resolve_java_home, resolve_pattern, resolve_targets, resolve_top,
};
use jar_verify::filter::normalize_class_name;
use jar_verify::report::{render_json, render_text, write_output};
use jar_verify::resolve::ClasspathResolver;
use jar_verify::scan::collect_artifacts;
use jar_verify::verify::{VerifySettings, verify_all};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = parse_cli();

    match cli.command.clone() {
        Commands::Verify {
            targets,
            pattern,
            recursive,
            top,
            format,
            output,
        } => {
            let settings = VerifySettings {
                top: resolve_top(top)?,
                ..settings_from(&cli)
            };
            run_verify(
                &cli,
                &resolve_targets(&targets),
                &resolve_pattern(pattern.as_deref()),
                recursive,
                &settings,
                format,
                output.as_deref(),
            )?;
        }
        Commands::Methods {
            jar_path,
            class_name,
            format,
        } => {
            let result = resolve_methods(&jar_path, &class_name, &settings_from(&cli))?;
            write_methods_output(&result, format)?;
        }
    }

    Ok(())
}

fn settings_from(cli: &Cli) -> VerifySettings {
    VerifySettings {
        classpath: resolve_classpath(&cli.classpath),
        java_home: resolve_java_home(cli.java_home.as_deref()),
        ..VerifySettings::default()
    }
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_verify(args))
}

/// `jar-verify target/app.jar` is shorthand for `jar-verify verify target/app.jar`.
fn rewrite_args_for_implicit_verify(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["verify", "methods", "help"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if a == "--classpath" || a == "--java-home" {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "verify".to_string());
        }
    }

    args
}

fn log(cli: &Cli, message: &str) {
    if !cli.quiet {
        eprintln!("[jar-verify] {message}");
    }
}

fn run_verify(
    cli: &Cli,
    targets: &[PathBuf],
    pattern: &str,
    recursive: bool,
    settings: &VerifySettings,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();
    let artifacts = collect_artifacts(targets, pattern, recursive)?;

    let outcomes = verify_all(&artifacts, settings, |path| {
        log(cli, &format!("Testing file: {}", path.display()));
    });

    let content = match format {
        OutputFormat::Text => render_text(&outcomes),
        OutputFormat::Json => render_json(&outcomes)?,
    };
    write_output(&content, output)?;

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    log(
        cli,
        &format!(
            "Verified {} artifact(s), {failed} failed, in {} ms",
            outcomes.len(),
            start.elapsed().as_millis()
        ),
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {} artifact(s) failed verification", outcomes.len());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct MethodsResult {
    class_name: String,
    jar_path: String,
    resolvable: bool,
    method_count: Option<usize>,
    methods: Vec<String>,
}

fn resolve_methods(
    jar_path: &Path,
    class_name: &str,
    settings: &VerifySettings,
) -> Result<MethodsResult> {
    let class_name = normalize_class_name(class_name);
    let archive = Archive::open(jar_path)?;
    let classpath = settings
        .open_classpath()
        .with_context(|| format!("Failed to open classpath for {}", jar_path.display()))?;
    let mut resolver = ClasspathResolver::for_archive(&archive, classpath);
    let methods = resolver.public_methods(&class_name);

    Ok(MethodsResult {
        jar_path: jar_path.to_string_lossy().to_string(),
        resolvable: methods.is_some(),
        method_count: methods.as_ref().map(|m| m.len()),
        methods: methods
            .map(|m| m.iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
        class_name,
    })
}

fn write_methods_output(result: &MethodsResult, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("class_name: {}\n", result.class_name));
            out.push_str(&format!("jar: {}\n", result.jar_path));
            match result.method_count {
                Some(count) => {
                    out.push_str(&format!("method_count: {count}\n"));
                    for m in &result.methods {
                        out.push_str(&format!("- {m}\n"));
                    }
                }
                None => out.push_str("unresolvable: class or one of its supertypes is missing\n"),
            }
            out
        }
    };
    write_output(&content, None)
}
