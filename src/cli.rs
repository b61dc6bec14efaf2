//! Minimal CLI: infer → Go types
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use crate::dump::{DumpFormat, write_dump};
use crate::settings::{MergeOrder, Settings};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer a Go type definition from an example XML document
#[derive(Parser, Debug)]
#[command(name = "xml-osi", version)]
pub struct CommandLineInterface {
    /// XML input file (stdin if omitted)
    input: Option<PathBuf>,

    /// dump the intermediate type tree to this file
    #[arg(long)]
    dump: Option<PathBuf>,

    /// format of the tree dump
    #[arg(long, value_enum, default_value_t = DumpFormat::Xml)]
    dump_format: DumpFormat,

    /// squash repeated elements into lists and merge their struct fields
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    normalize: bool,

    /// treat '-' and '_' as word boundaries in identifiers
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    title: bool,

    /// how matched fields are reconciled while merging repeated structs
    #[arg(long, value_enum, default_value_t = MergeOrder::Absorb)]
    merge_order: MergeOrder,

    /// fail when repeated elements have shapes that cannot be merged
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// classify element text as bool, int64 or float64 instead of string
    #[arg(long, default_value_t = false)]
    infer_scalars: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            title_case: self.title,
            normalize: self.normalize,
            merge_order: self.merge_order,
            strict: self.strict,
            infer_scalars: self.infer_scalars,
        }
    }

    pub fn run(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(&mut out)
    }

    /// Runs the pipeline, writing the generated source to `out`.
    ///
    /// When formatting fails the unformatted source is still written before
    /// the error is returned.
    pub fn run_with<W: Write>(&self, out: &mut W) -> Result<()> {
        let settings = self.settings();
        let source = self.open_input()?;
        let dump = match self.dump.as_ref() {
            Some(path) => Some(
                File::create(path).with_context(|| format!("failed to create dump file {}", path.display()))?,
            ),
            None => None,
        };

        // 1) build the raw tree
        let mut root = crate::populate(source, &settings).context("failed to decode input")?;

        // 2) squash repeated siblings
        if settings.normalize {
            crate::inference::normalize(&mut root, &settings).context("failed to normalize type tree")?;
        }

        // 3) debug dump
        if let Some(file) = dump {
            let mut writer = BufWriter::new(file);
            write_dump(&root, self.dump_format, &mut writer).context("failed to dump type tree")?;
            writer.flush().context("failed to dump type tree")?;
            tracing::debug!(format = ?self.dump_format, "wrote type tree dump");
        }

        // 4) render
        let rendered = crate::codegen::render(&root, &settings);
        out.write_all(rendered.source.as_bytes()).context("failed to write output")?;
        out.flush().context("failed to write output")?;

        match rendered.format_error {
            Some(error) => Err(anyhow::Error::new(error).context("failed to format source")),
            None => Ok(()),
        }
    }

    fn open_input(&self) -> Result<Box<dyn BufRead>> {
        match self.input.as_ref() {
            Some(path) => {
                let file = File::open(path).with_context(|| format!("failed to open input {}", path.display()))?;
                Ok(Box::new(BufReader::new(file)))
            }
            None => Ok(Box::new(io::stdin().lock())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_defaults() {
        let cli = CommandLineInterface::try_parse_from(["xml-osi"]).unwrap();
        assert_eq!(cli.settings(), Settings::default());
        assert_eq!(cli.dump_format, DumpFormat::Xml);
        assert!(cli.input.is_none());
    }

    #[test]
    fn boolean_flags_take_values() {
        let cli = CommandLineInterface::try_parse_from([
            "xml-osi",
            "--normalize",
            "false",
            "--title=false",
            "--merge-order",
            "literal",
            "--strict",
            "--infer-scalars",
            "doc.xml",
        ])
        .unwrap();
        let settings = cli.settings();
        assert!(!settings.normalize);
        assert!(!settings.title_case);
        assert_eq!(settings.merge_order, MergeOrder::Literal);
        assert!(settings.strict);
        assert!(settings.infer_scalars);
        assert_eq!(cli.input, Some(PathBuf::from("doc.xml")));
    }
}
