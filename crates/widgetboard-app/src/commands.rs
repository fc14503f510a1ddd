//! Shell command parsing and the command reference.

use thiserror::Error;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Palette,
    Drop { kind: String, x: i64, y: i64 },
    Move { id: String, x: u32, y: u32 },
    Resize { id: String, w: u32, h: u32 },
    Fit { id: String },
    Edit { id: String },
    Set { field: String, value: String },
    Header { column: usize, value: String },
    Cell { row: usize, column: usize, value: String },
    AddColumn,
    AddRow,
    Save,
    Cancel,
    Delete { id: String },
    Click { id: String },
    Undo,
    Redo,
    Clear,
    List,
    Show { id: String },
    Status,
    Persist,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("{command}: missing <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{command}: <{argument}> must be a number, got '{value}'")]
    InvalidNumber {
        command: &'static str,
        argument: &'static str,
        value: String,
    },
}

/// Whitespace-separated arguments of one command line.
struct Args<'a> {
    command: &'static str,
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn word(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            return Err(CommandError::MissingArgument {
                command: self.command,
                argument,
            });
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.rest = &rest[end..];
        Ok(&rest[..end])
    }

    fn number<T: std::str::FromStr>(&mut self, argument: &'static str) -> Result<T, CommandError> {
        let word = self.word(argument)?;
        word.parse().map_err(|_| CommandError::InvalidNumber {
            command: self.command,
            argument,
            value: word.to_string(),
        })
    }

    /// Everything left on the line, which may contain spaces or be empty.
    fn text(&mut self) -> String {
        let text = self.rest.trim().to_string();
        self.rest = "";
        text
    }
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments give `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let Some(entry) = CommandRegistry::all().iter().find(|c| c.name == name) else {
            return Err(CommandError::Unknown(name.to_string()));
        };
        let mut args = Args {
            command: entry.name,
            rest,
        };

        let command = match entry.name {
            "palette" => Command::Palette,
            "drop" => Command::Drop {
                kind: args.word("kind")?.to_string(),
                x: args.number("x")?,
                y: args.number("y")?,
            },
            "move" => Command::Move {
                id: args.word("id")?.to_string(),
                x: args.number("x")?,
                y: args.number("y")?,
            },
            "resize" => Command::Resize {
                id: args.word("id")?.to_string(),
                w: args.number("w")?,
                h: args.number("h")?,
            },
            "fit" => Command::Fit {
                id: args.word("id")?.to_string(),
            },
            "edit" => Command::Edit {
                id: args.word("id")?.to_string(),
            },
            "set" => Command::Set {
                field: args.word("field")?.to_string(),
                value: args.text(),
            },
            "header" => Command::Header {
                column: args.number("column")?,
                value: args.text(),
            },
            "cell" => Command::Cell {
                row: args.number("row")?,
                column: args.number("column")?,
                value: args.text(),
            },
            "addcol" => Command::AddColumn,
            "addrow" => Command::AddRow,
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "delete" => Command::Delete {
                id: args.word("id")?.to_string(),
            },
            "click" => Command::Click {
                id: args.word("id")?.to_string(),
            },
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "clear" => Command::Clear,
            "list" => Command::List,
            "show" => Command::Show {
                id: args.word("id")?.to_string(),
            },
            "status" => Command::Status,
            "persist" => Command::Persist,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Reference entry for one command.
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

impl CommandHelp {
    pub const fn new(name: &'static str, usage: &'static str, description: &'static str) -> Self {
        Self {
            name,
            usage,
            description,
        }
    }
}

/// Registry of all shell commands.
pub struct CommandRegistry;

const COMMANDS: &[CommandHelp] = &[
    CommandHelp::new("palette", "palette", "List the widgets that can be dropped"),
    CommandHelp::new("drop", "drop <kind> <x> <y>", "Drop a new widget on a grid cell"),
    CommandHelp::new("move", "move <id> <x> <y>", "Move a widget"),
    CommandHelp::new("resize", "resize <id> <w> <h>", "Resize a widget"),
    CommandHelp::new("fit", "fit <id>", "Resize a widget to fit its content"),
    CommandHelp::new("edit", "edit <id>", "Start editing a widget"),
    CommandHelp::new("set", "set <field> <value>", "Set a field on the widget being edited"),
    CommandHelp::new("header", "header <column> <value>", "Set a table header"),
    CommandHelp::new("cell", "cell <row> <column> <value>", "Set a table cell"),
    CommandHelp::new("addcol", "addcol", "Add a column to the table being edited"),
    CommandHelp::new("addrow", "addrow", "Add a row to the table being edited"),
    CommandHelp::new("save", "save", "Validate and commit the edit"),
    CommandHelp::new("cancel", "cancel", "Discard the edit"),
    CommandHelp::new("delete", "delete <id>", "Delete a widget"),
    CommandHelp::new("click", "click <id>", "Run a button's action"),
    CommandHelp::new("undo", "undo", "Undo the last change"),
    CommandHelp::new("redo", "redo", "Redo the last undone change"),
    CommandHelp::new("clear", "clear", "Remove every widget"),
    CommandHelp::new("list", "list", "List widgets and their positions"),
    CommandHelp::new("show", "show <id>", "Print a widget as JSON"),
    CommandHelp::new("status", "status", "Show board and history status"),
    CommandHelp::new("persist", "persist", "Save the board now"),
    CommandHelp::new("help", "help", "Show this list"),
    CommandHelp::new("quit", "quit", "Save and exit"),
    CommandHelp::new("exit", "exit", "Save and exit"),
];

impl CommandRegistry {
    /// Get all registered commands.
    pub fn all() -> &'static [CommandHelp] {
        COMMANDS
    }

    /// Format the command list for display.
    pub fn help_text() -> String {
        let mut text = String::from("Commands:\n");
        for command in Self::all() {
            text.push_str(&format!("  {:30} {}\n", command.usage, command.description));
        }
        text
    }
}
