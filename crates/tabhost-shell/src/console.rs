//! Line-oriented command language read from stdin
//!
//! Tabs are referenced either by their 1-based position in the current
//! server's tab bar or by (a prefix of) their view id. Servers are referenced
//! by name or id.

use anyhow::{anyhow, bail, Result};

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    AddServer { name: String, url: String },
    RemoveServer(String),
    SwitchServer(String),
    Servers,
    NewTab,
    Switch(String),
    Close(String),
    Next,
    Prev,
    Order(Vec<String>),
    Tabs,
    Login,
    Logout,
    Loaded(String),
    Failed { tab: String, error: String },
    Resize { width: u32, height: u32 },
    Focus,
    Reload,
    Find,
    Title { tab: String, title: String },
    Help,
    Quit,
}

pub const HELP: &str = "\
add-server <name> <url>   add a server and make it current
remove-server <server>    remove a server
switch-server <server>    make a server current
servers                   list servers
new-tab                   open a tab on the current server
switch <tab>              show a tab
close <tab>               close a tab
next | prev               cycle through tabs
order <tab>...            reorder the current server's tabs
tabs                      list the current server's tabs
login | logout            change the current server's login state
loaded <tab>              the tab's web app finished loading
failed <tab> <error>      the tab failed to load
resize <width> <height>   resize the window
focus                     focus the window
reload                    reload the active tab
find                      open find-in-page on the active tab
title <tab> <title>       change a tab's title
quit                      exit";

/// Parse one line; blank lines and `#` comments yield `None`
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word {
        "add-server" => match args.as_slice() {
            [name, url] => ConsoleCommand::AddServer {
                name: name.to_string(),
                url: url.to_string(),
            },
            _ => bail!("usage: add-server <name> <url>"),
        },
        "remove-server" => ConsoleCommand::RemoveServer(single(&args, "remove-server <server>")?),
        "switch-server" => ConsoleCommand::SwitchServer(single(&args, "switch-server <server>")?),
        "servers" => ConsoleCommand::Servers,
        "new-tab" => ConsoleCommand::NewTab,
        "switch" => ConsoleCommand::Switch(single(&args, "switch <tab>")?),
        "close" => ConsoleCommand::Close(single(&args, "close <tab>")?),
        "next" => ConsoleCommand::Next,
        "prev" => ConsoleCommand::Prev,
        "order" => {
            if args.is_empty() {
                bail!("usage: order <tab>...");
            }
            ConsoleCommand::Order(args.iter().map(|s| s.to_string()).collect())
        }
        "tabs" => ConsoleCommand::Tabs,
        "login" => ConsoleCommand::Login,
        "logout" => ConsoleCommand::Logout,
        "loaded" => ConsoleCommand::Loaded(single(&args, "loaded <tab>")?),
        "failed" => {
            let (tab, error) = split_first(rest, "failed <tab> <error>")?;
            ConsoleCommand::Failed { tab, error }
        }
        "resize" => match args.as_slice() {
            [width, height] => ConsoleCommand::Resize {
                width: width
                    .parse()
                    .map_err(|_| anyhow!("invalid width: {}", width))?,
                height: height
                    .parse()
                    .map_err(|_| anyhow!("invalid height: {}", height))?,
            },
            _ => bail!("usage: resize <width> <height>"),
        },
        "focus" => ConsoleCommand::Focus,
        "reload" => ConsoleCommand::Reload,
        "find" => ConsoleCommand::Find,
        "title" => {
            let (tab, title) = split_first(rest, "title <tab> <title>")?;
            ConsoleCommand::Title { tab, title }
        }
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => bail!("unknown command: {} (try `help`)", other),
    };

    Ok(Some(command))
}

fn single(args: &[&str], usage: &str) -> Result<String> {
    match args {
        [arg] => Ok(arg.to_string()),
        _ => bail!("usage: {}", usage),
    }
}

/// First word, then the remainder verbatim
fn split_first(rest: &str, usage: &str) -> Result<(String, String)> {
    match rest.split_once(char::is_whitespace) {
        Some((first, remainder)) if !remainder.trim().is_empty() => {
            Ok((first.to_string(), remainder.trim().to_string()))
        }
        _ => bail!("usage: {}", usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse("add-server community https://community.example.com").unwrap(),
            Some(ConsoleCommand::AddServer {
                name: "community".to_string(),
                url: "https://community.example.com".to_string(),
            })
        );
        assert_eq!(parse("  next ").unwrap(), Some(ConsoleCommand::Next));
        assert_eq!(
            parse("order 3 1 2").unwrap(),
            Some(ConsoleCommand::Order(vec![
                "3".to_string(),
                "1".to_string(),
                "2".to_string()
            ]))
        );
        assert_eq!(
            parse("resize 1280 800").unwrap(),
            Some(ConsoleCommand::Resize {
                width: 1280,
                height: 800
            })
        );
    }

    #[test]
    fn test_trailing_text_is_kept_verbatim() {
        assert_eq!(
            parse("title 2 Town  Square").unwrap(),
            Some(ConsoleCommand::Title {
                tab: "2".to_string(),
                title: "Town  Square".to_string(),
            })
        );
        assert_eq!(
            parse("failed 1 ERR_CONNECTION_REFUSED (-102)").unwrap(),
            Some(ConsoleCommand::Failed {
                tab: "1".to_string(),
                error: "ERR_CONNECTION_REFUSED (-102)".to_string(),
            })
        );
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   # setup").unwrap(), None);
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse("switch").is_err());
        assert!(parse("close 1 2").is_err());
        assert!(parse("resize wide 800").is_err());
        assert!(parse("title 1").is_err());
        assert!(parse("order").is_err());

        let err = parse("launch").unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }
}
