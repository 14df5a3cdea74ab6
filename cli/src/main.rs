mod atomic_write;
mod config;
mod inspect;
mod logging;

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use hanseg_tui::Editor;
use hanseg_tui::ExitReason;
use hanseg_tui::segmentation::IcuTokenizer;
use hanseg_tui::segmentation::Tokenizer;

use crate::config::ConfigKey;
use crate::config::ConfigStore;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Word-boundary navigation for Chinese text: inspect segments or edit with segment-aware word keys"
)]
struct Cli {
    /// Append debug logs to this file (filter with `RUST_LOG`).
    #[arg(long, env = "HANSEG_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print the segments of TEXT (or stdin).
    Segment {
        text: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the word at a byte offset of TEXT and the words on either side of it.
    Word {
        text: String,
        /// Byte offset into TEXT.
        #[arg(long)]
        at: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print the word-boundary decorations of TEXT (or stdin).
    Decorate {
        text: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Open FILE in the terminal editor. Without FILE, edit an unsaved scratch buffer.
    Edit { file: Option<PathBuf> },
    /// Read or change settings in `~/.hanseg/config.toml`.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print one setting, or every setting when KEY is omitted.
    Get { key: Option<String> },
    /// Persist a setting.
    Set { key: String, value: String },
    /// Print the config file location.
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        logging::init_file_logging(path)?;
    }

    let tokenizer: Rc<dyn Tokenizer> = Rc::new(IcuTokenizer::new());
    match cli.command {
        CliCommand::Segment { text, json } => {
            let text = inspect::read_input(text)?;
            print!("{}", finish(inspect::segment_report(tokenizer.as_ref(), &text, json)?));
        }
        CliCommand::Word { text, at, json } => {
            print!(
                "{}",
                finish(inspect::word_report(tokenizer.as_ref(), &text, at, json)?)
            );
        }
        CliCommand::Decorate { text, json } => {
            let text = inspect::read_input(text)?;
            print!(
                "{}",
                finish(inspect::decorate_report(tokenizer.as_ref(), &text, json)?)
            );
        }
        CliCommand::Edit { file } => run_edit(file.as_deref(), tokenizer)?,
        CliCommand::Config { action } => run_config(action)?,
    }
    Ok(())
}

/// Make sure reports end with exactly one newline.
fn finish(mut report: String) -> String {
    if !report.is_empty() && !report.ends_with('\n') {
        report.push('\n');
    }
    report
}

fn run_edit(file: Option<&Path>, tokenizer: Rc<dyn Tokenizer>) -> anyhow::Result<()> {
    let config = match ConfigStore::new_default() {
        Ok(store) => store.load(),
        Err(err) => {
            eprintln!("warning: failed to locate hanseg config: {err}");
            Default::default()
        }
    };

    let text = match file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(anyhow::Error::new(err).context(format!("read {}", path.display())));
            }
        },
        None => String::new(),
    };
    let title = file.map_or_else(|| "[scratch]".to_string(), |path| path.display().to_string());

    let mut editor = Editor::new(&text, title, tokenizer, config.editor_options());
    let exit = hanseg_tui::run_editor(&mut editor, |contents| match file {
        Some(path) => atomic_write::write_atomic_text(path, contents),
        None => anyhow::bail!("scratch buffer has no file; run `hanseg edit FILE` to save"),
    })?;

    tracing::info!(?exit, "editor session ended");
    if exit.unsaved_changes {
        eprintln!("warning: exited with unsaved changes");
    }
    if exit.exit_reason == ExitReason::Interrupted {
        std::process::exit(130);
    }
    Ok(())
}

fn run_config(action: ConfigAction) -> anyhow::Result<()> {
    let store = ConfigStore::new_default()?;
    match action {
        ConfigAction::Get { key: Some(key) } => {
            let key: ConfigKey = key.parse()?;
            println!("{}", store.load().display_value(key));
        }
        ConfigAction::Get { key: None } => {
            let config = store.load();
            for key in ConfigKey::ALL {
                println!("{} = {}", key.name(), config.display_value(key));
            }
        }
        ConfigAction::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            store
                .set(key, &value)
                .with_context(|| format!("update {}", store.path().display()))?;
        }
        ConfigAction::Path => println!("{}", store.path().display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn word_requires_an_offset() {
        assert!(Cli::try_parse_from(["hanseg", "word", "我爱北京"]).is_err());
        let cli = Cli::try_parse_from(["hanseg", "word", "我爱北京", "--at", "6", "--json"])
            .expect("parse args");
        let CliCommand::Word { text, at, json } = cli.command else {
            panic!("expected word command, got: {:?}", cli.command);
        };
        assert_eq!((text.as_str(), at, json), ("我爱北京", 6, true));
    }

    #[test]
    fn log_file_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["hanseg", "segment", "北京", "--log-file", "hanseg.log"])
            .expect("parse args");
        assert_eq!(cli.log_file, Some(PathBuf::from("hanseg.log")));
    }

    #[test]
    fn config_set_takes_key_and_value() {
        let cli = Cli::try_parse_from(["hanseg", "config", "set", "keymap.platform", "mac"])
            .expect("parse args");
        let CliCommand::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        else {
            panic!("expected config set, got: {:?}", cli.command);
        };
        assert_eq!((key.as_str(), value.as_str()), ("keymap.platform", "mac"));
    }

    #[test]
    fn finish_adds_a_single_trailing_newline() {
        assert_eq!(finish("[]".to_string()), "[]\n");
        assert_eq!(finish("a\n".to_string()), "a\n");
        assert_eq!(finish(String::new()), "");
    }
}
