use crate::config::load_config;
use crate::draw::emit_primitives;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_project;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gantt-svg", version, about = "Render Gantt-chart project plans to SVG")]
pub struct Args {
    /// Input project file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Config JSON file (theme, themeVariables, layout, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write the computed geometry as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Fail when any entity had to be skipped
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let parsed = parse_project(&input)?;
    for warning in &parsed.warnings {
        eprintln!("warning: {warning}");
    }

    let layout = compute_layout(&parsed.document, &config.theme, &config.layout)?;
    for err in &layout.errors {
        eprintln!("skipped: {err}");
    }
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)?;
    }

    let primitives = emit_primitives(&layout, &config.theme, &config.layout);
    let svg = render_svg(&primitives, layout.width, layout.height, &config.theme);
    match resolve_format(args.output_format, args.output.as_deref()) {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }

    if args.strict && !layout.errors.is_empty() {
        return Err(anyhow::anyhow!(
            "{} entities were skipped (--strict)",
            layout.errors.len()
        ));
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn resolve_format(explicit: Option<OutputFormat>, output: Option<&Path>) -> OutputFormat {
    if let Some(format) = explicit {
        return format;
    }
    let is_png = output
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        OutputFormat::Png
    } else {
        OutputFormat::Svg
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_output_extension() {
        assert_eq!(
            resolve_format(None, Some(Path::new("plan.PNG"))),
            OutputFormat::Png
        );
        assert_eq!(
            resolve_format(None, Some(Path::new("plan.svg"))),
            OutputFormat::Svg
        );
        assert_eq!(resolve_format(None, None), OutputFormat::Svg);
        assert_eq!(
            resolve_format(Some(OutputFormat::Svg), Some(Path::new("plan.png"))),
            OutputFormat::Svg
        );
    }

    #[test]
    fn png_requires_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("a.png")), "png").unwrap(),
            PathBuf::from("a.png")
        );
    }

    #[test]
    fn parses_long_camel_case_flags() {
        let args = Args::try_parse_from([
            "gantt-svg",
            "-i",
            "plan.json",
            "-e",
            "png",
            "-o",
            "out.png",
            "--dumpLayout",
            "layout.json",
            "--strict",
        ])
        .unwrap();
        assert_eq!(args.output_format, Some(OutputFormat::Png));
        assert_eq!(args.dump_layout, Some(PathBuf::from("layout.json")));
        assert!(args.strict);
    }
}
