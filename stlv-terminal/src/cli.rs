/// Command line surface and model file lookup
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use stlv_core::ViewOptions;

const STL_SUFFIX: &str = ".stl";

#[derive(Debug, Parser)]
#[command(name = "stlv")]
#[command(about = "Binary STL viewer for the terminal")]
#[command(version, allow_negative_numbers = true)]
pub struct Cli {
    /// Model file; `.stl` is appended when missing. Prompted for when omitted.
    pub file: Option<String>,

    /// Either one render mode (1-6, -1, plain, sharp, wire, balloon, xray,
    /// shaded, xrays, edge) or bed extents `X Y [Z]`
    #[arg(value_name = "VIEW", num_args = 0..=3, allow_hyphen_values = true)]
    pub view: Vec<String>,
}

impl Cli {
    pub fn view_options(&self) -> stlv_core::Result<ViewOptions> {
        ViewOptions::from_args(&self.view)
    }
}

/// The name as typed, then with `.stl` appended if it lacks the suffix.
pub fn candidate_paths(name: &str) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(name)];
    if !name.ends_with(STL_SUFFIX) {
        candidates.push(PathBuf::from(format!("{name}{STL_SUFFIX}")));
    }
    candidates
}

/// First candidate that names an existing file.
pub fn resolve_model_path(name: &str) -> Option<PathBuf> {
    candidate_paths(name).into_iter().find(|path| path.is_file())
}

/// Resolve a file name given on the command line. There is no retry here.
pub fn require_model_path(name: &str) -> stlv_core::Result<PathBuf> {
    resolve_model_path(name).ok_or_else(|| stlv_core::Error::FileNotFound {
        path: PathBuf::from(name),
    })
}

/// Ask for a file name until one resolves.
///
/// # Errors
///
/// Fails when the input ends before an existing file was named.
pub fn prompt_for_model<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<PathBuf> {
    loop {
        write!(output, "your file: ")?;
        output.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("failed to read file name")?;
        if read == 0 {
            bail!("no model file given");
        }

        let name = line.trim_end_matches(['\r', '\n']);
        if let Some(path) = resolve_model_path(name) {
            return Ok(path);
        }
        writeln!(output, "File does not exist!")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use stlv_core::{BedSpec, RenderMode};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stlv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positional_surface() {
        let cli = parse(&[]);
        assert!(cli.file.is_none() && cli.view.is_empty());

        let cli = parse(&["part.stl"]);
        assert_eq!(cli.file.as_deref(), Some("part.stl"));
        assert_eq!(cli.view_options().unwrap(), ViewOptions::default());

        let cli = parse(&["part.stl", "-1"]);
        assert_eq!(cli.view_options().unwrap(), ViewOptions::Mode(RenderMode::RandomColors));

        let cli = parse(&["part.stl", "220", "220"]);
        assert_eq!(
            cli.view_options().unwrap(),
            ViewOptions::Bed(BedSpec::footprint(220.0, 220.0))
        );

        let cli = parse(&["part.stl", "220", "220", "250"]);
        assert_eq!(
            cli.view_options().unwrap(),
            ViewOptions::Bed(BedSpec::volume(220.0, 220.0, 250.0))
        );
    }

    #[test]
    fn test_too_many_view_arguments() {
        let rejected = match Cli::try_parse_from(["stlv", "part.stl", "1", "2", "3", "4"]) {
            Err(_) => true,
            Ok(cli) => cli.view_options().is_err(),
        };
        assert!(rejected);
    }

    #[test]
    fn test_candidate_paths() {
        assert_eq!(candidate_paths("a.stl"), [PathBuf::from("a.stl")]);
        assert_eq!(
            candidate_paths("models/a"),
            [PathBuf::from("models/a"), PathBuf::from("models/a.stl")]
        );
    }

    #[test]
    fn test_resolve_appends_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("bracket.stl");
        fs::write(&model, [0u8; 84]).unwrap();

        let bare = dir.path().join("bracket");
        assert_eq!(resolve_model_path(bare.to_str().unwrap()), Some(model.clone()));
        assert_eq!(resolve_model_path(model.to_str().unwrap()), Some(model));

        let missing = dir.path().join("nothing");
        assert!(matches!(
            require_model_path(missing.to_str().unwrap()),
            Err(stlv_core::Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_prompt_retries_until_found() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("gear.stl");
        fs::write(&model, [0u8; 84]).unwrap();

        let answers = format!(
            "{}\n{}\n",
            dir.path().join("missing").display(),
            dir.path().join("gear").display()
        );
        let mut input = Cursor::new(answers);
        let mut output = Vec::new();

        let path = prompt_for_model(&mut input, &mut output).unwrap();
        assert_eq!(path, model);

        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(transcript, "your file: File does not exist!\nyour file: ");
    }

    #[test]
    fn test_prompt_gives_up_at_end_of_input() {
        let mut input = Cursor::new("nope\n");
        let mut output = Vec::new();
        assert!(prompt_for_model(&mut input, &mut output).is_err());
    }
}
