//! Command grammar exchanged with viewers.
//!
//! Commands are whitespace-separated and prefixed by a namespace:
//!
//! ```text
//! <ns>.changetab <index|up|down>
//! <ns>.callaction <column> <row> [args...]
//! <ns>.changecolumnpage <column> <op:0..4> [page]
//! <ns>.close
//! ```

use crate::error::{CoreError, CoreResult};
use crate::page::PageOp;

/// Which tab a `changetab` command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabTarget {
    /// Absolute index, clamped by the panel.
    Index(i64),
    /// Next tab, wrapping to the first.
    Up,
    /// Previous tab, wrapping to the last.
    Down,
}

/// A parsed viewer command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ChangeTab(TabTarget),
    CallAction {
        column: usize,
        row: usize,
        args: Vec<String>,
    },
    ChangeColumnPage {
        column: usize,
        op: PageOp,
    },
    Close,
}

impl Command {
    /// Parses `line` under `namespace`.
    ///
    /// # Example
    ///
    /// ```
    /// use keel_core::{Command, PageOp};
    ///
    /// let cmd = Command::parse("keel", "keel.changecolumnpage 0 4 3").unwrap();
    /// assert_eq!(cmd, Command::ChangeColumnPage { column: 0, op: PageOp::Jump(3) });
    /// assert!(Command::parse("keel", "other.close").is_err());
    /// ```
    pub fn parse(namespace: &str, line: &str) -> CoreResult<Command> {
        let mut tokens = line.split_whitespace();
        let head = tokens
            .next()
            .ok_or_else(|| CoreError::command(line, "empty command"))?;
        let verb = head
            .strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('.'))
            .ok_or_else(|| CoreError::command(line, format!("not in namespace '{namespace}'")))?;

        let args: Vec<&str> = tokens.collect();
        let index = |i: usize, what: &str| -> CoreResult<usize> {
            let raw = args
                .get(i)
                .ok_or_else(|| CoreError::command(line, format!("missing {what}")))?;
            raw.parse::<usize>()
                .map_err(|_| CoreError::command(line, format!("{what} '{raw}' is not a number")))
        };

        match verb {
            "changetab" => {
                let target = match args.first().copied() {
                    Some("up") => TabTarget::Up,
                    Some("down") => TabTarget::Down,
                    Some(raw) => raw.parse::<i64>().map(TabTarget::Index).map_err(|_| {
                        CoreError::command(line, format!("tab '{raw}' is not a number"))
                    })?,
                    None => return Err(CoreError::command(line, "missing tab")),
                };
                Ok(Command::ChangeTab(target))
            }
            "callaction" => Ok(Command::CallAction {
                column: index(0, "column")?,
                row: index(1, "row")?,
                args: args.iter().skip(2).map(|s| (*s).to_string()).collect(),
            }),
            "changecolumnpage" => {
                let column = index(0, "column")?;
                let op = match index(1, "page operation")? {
                    0 => PageOp::Previous,
                    1 => PageOp::Next,
                    2 => PageOp::First,
                    3 => PageOp::Last,
                    4 => {
                        let raw = args
                            .get(2)
                            .ok_or_else(|| CoreError::command(line, "missing page number"))?;
                        let page = raw.parse::<i64>().map_err(|_| {
                            CoreError::command(line, format!("page '{raw}' is not a number"))
                        })?;
                        PageOp::Jump(page)
                    }
                    other => {
                        return Err(CoreError::command(
                            line,
                            format!("unknown page operation {other}"),
                        ))
                    }
                };
                Ok(Command::ChangeColumnPage { column, op })
            }
            "close" => Ok(Command::Close),
            other => Err(CoreError::command(line, format!("unknown verb '{other}'"))),
        }
    }

    /// Formats the command as a line under `namespace`.
    #[must_use]
    pub fn encode(&self, namespace: &str) -> String {
        match self {
            Command::ChangeTab(TabTarget::Index(i)) => format!("{namespace}.changetab {i}"),
            Command::ChangeTab(TabTarget::Up) => format!("{namespace}.changetab up"),
            Command::ChangeTab(TabTarget::Down) => format!("{namespace}.changetab down"),
            Command::CallAction { column, row, args } => {
                let mut line = format!("{namespace}.callaction {column} {row}");
                for arg in args {
                    line.push(' ');
                    line.push_str(arg);
                }
                line
            }
            Command::ChangeColumnPage { column, op } => match op {
                PageOp::Jump(page) => {
                    format!("{namespace}.changecolumnpage {column} 4 {page}")
                }
                op => format!("{namespace}.changecolumnpage {column} {}", op.code()),
            },
            Command::Close => format!("{namespace}.close"),
        }
    }
}

/// Prefix of every action command for the row at `(column, row)`.
#[must_use]
pub fn action_prefix(namespace: &str, column: usize, row: usize) -> String {
    format!("{namespace}.callaction {column} {row}")
}
