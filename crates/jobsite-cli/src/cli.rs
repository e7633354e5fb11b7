use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jobsite::{ListKind, PhotoSection, Priority};

#[derive(Parser, Debug)]
#[command(
    name = "jobsite",
    version,
    about = "Jobsite Buddy: tasks, materials, shopping lists, photos and notes per job site"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Data directory (default: ~/.jobsite-buddy)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.json)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Print responses as JSON
    #[arg(long = "json", global = true, default_value_t = false)]
    pub json: bool,

    /// Debug logging (overrides RUST_LOG)
    #[arg(long = "verbose", short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, list and show job sites
    Site {
        #[command(subcommand)]
        command: SiteCommand,
    },

    /// Edit the item lists of a site
    Item {
        #[command(subcommand)]
        command: ItemCommand,
    },

    /// Replace or extend the notes of a site
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },

    /// Manage photo references of a site
    Photo {
        #[command(subcommand)]
        command: PhotoCommand,
    },

    /// Search and download equipment manuals
    Manual {
        #[command(subcommand)]
        command: ManualCommand,
    },

    /// Look for a price on a product page
    Price {
        /// Product page URL
        url: String,
    },

    /// Extract text from an image (needs the `ocr` feature and ocr.enabled)
    Ocr {
        /// Image file
        file: PathBuf,
    },

    /// Write the stored database to a file or stdout
    Export {
        /// Destination file (stdout when omitted)
        #[arg(long = "output", short = 'o')]
        output: Option<PathBuf>,
    },

    /// Delete every site (photo files stay on disk)
    Reset {
        /// Confirm the reset
        #[arg(long = "yes", default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SiteCommand {
    /// Create a site (no-op if it exists)
    Create { name: String },

    /// List all sites with counts
    List,

    /// Show a site, optionally filtered
    Show {
        name: String,

        /// Case-insensitive filter over items, links and notes
        #[arg(long = "query", short = 'q', default_value = "")]
        query: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// Add an item to a list
    Add {
        site: String,

        /// what_to_do | materials_need | materials_have | to_buy (or todo, need, have, buy)
        list: ListKind,

        text: String,

        #[arg(long = "priority", short = 'p', default_value = "medium")]
        priority: Priority,

        #[arg(long = "link", short = 'l')]
        link: Option<String>,
    },

    /// Toggle an item between done and open
    Done {
        site: String,
        list: ListKind,
        /// Item id or unique id prefix
        id: String,
    },

    /// Change the priority of an item
    Priority {
        site: String,
        list: ListKind,
        id: String,
        priority: Priority,
    },

    /// Remove an item
    Remove {
        site: String,
        list: ListKind,
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    Set { site: String, text: String },
    Append { site: String, text: String },
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommand {
    /// Copy an image into the uploads directory and reference it
    Add {
        site: String,
        file: PathBuf,

        #[arg(long = "section", short = 's', default_value = "general")]
        section: PhotoSection,
    },

    /// Drop a photo reference by position (the file is kept)
    Remove {
        site: String,
        section: PhotoSection,
        index: usize,
    },

    /// List photo paths
    List {
        site: String,

        #[arg(long = "section", short = 's')]
        section: Option<PhotoSection>,
    },

    /// Show image dimensions, or the raw path when a file cannot be read
    Preview {
        site: String,

        #[arg(long = "section", short = 's')]
        section: Option<PhotoSection>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ManualCommand {
    /// Search the web for PDF manuals
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Download a manual into the manuals directory
    Download { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_commands() {
        let cli = Cli::try_parse_from(["jobsite", "site", "create", "Smith Residence"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Site { command: SiteCommand::Create { ref name } } if name == "Smith Residence"
        ));

        let cli = Cli::try_parse_from(["jobsite", "site", "show", "Shop", "-q", "gfci"]).unwrap();
        match cli.command {
            Command::Site {
                command: SiteCommand::Show { name, query },
            } => {
                assert_eq!(name, "Shop");
                assert_eq!(query, "gfci");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_item_add_parses_enums() {
        let cli = Cli::try_parse_from([
            "jobsite", "item", "add", "Shop", "buy", "Wire nuts", "--priority", "high", "--link",
            "https://supplier.test/nuts",
        ])
        .unwrap();

        match cli.command {
            Command::Item {
                command:
                    ItemCommand::Add {
                        site,
                        list,
                        text,
                        priority,
                        link,
                    },
            } => {
                assert_eq!(site, "Shop");
                assert_eq!(list, ListKind::ToBuy);
                assert_eq!(text, "Wire nuts");
                assert_eq!(priority, Priority::High);
                assert_eq!(link.as_deref(), Some("https://supplier.test/nuts"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_item_add_defaults_to_medium() {
        let cli = Cli::try_parse_from(["jobsite", "item", "add", "Shop", "todo", "Trim out"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Item {
                command: ItemCommand::Add {
                    priority: Priority::Medium,
                    link: None,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_list_and_priority() {
        assert!(Cli::try_parse_from(["jobsite", "item", "add", "Shop", "groceries", "x"]).is_err());
        assert!(Cli::try_parse_from(["jobsite", "item", "priority", "Shop", "todo", "abcd", "urgent"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jobsite", "site", "list", "--json", "--data-dir", "/tmp/jobs", "-v",
        ])
        .unwrap();
        assert!(cli.global.json);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.data_dir, Some(PathBuf::from("/tmp/jobs")));
        assert_eq!(cli.global.config, None);
    }

    #[test]
    fn test_photo_commands() {
        let cli = Cli::try_parse_from(["jobsite", "photo", "add", "Shop", "panel.jpg"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Photo {
                command: PhotoCommand::Add {
                    section: PhotoSection::General,
                    ..
                }
            }
        ));

        let cli = Cli::try_parse_from(["jobsite", "photo", "remove", "Shop", "materials", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Photo {
                command: PhotoCommand::Remove {
                    section: PhotoSection::Materials,
                    index: 2,
                    ..
                }
            }
        ));

        assert!(Cli::try_parse_from(["jobsite", "photo", "remove", "Shop", "attic", "0"]).is_err());
    }

    #[test]
    fn test_manual_search_joins_words() {
        let cli = Cli::try_parse_from(["jobsite", "manual", "search", "Square", "D", "QO"]).unwrap();
        match cli.command {
            Command::Manual {
                command: ManualCommand::Search { query },
            } => assert_eq!(query.join(" "), "Square D QO"),
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["jobsite", "manual", "search"]).is_err());
    }

    #[test]
    fn test_reset_requires_flag_value() {
        let cli = Cli::try_parse_from(["jobsite", "reset"]).unwrap();
        assert!(matches!(cli.command, Command::Reset { yes: false }));

        let cli = Cli::try_parse_from(["jobsite", "reset", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Reset { yes: true }));
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["jobsite", "dashboard"]).is_err());
        assert!(Cli::try_parse_from(["jobsite"]).is_err());
    }
}
