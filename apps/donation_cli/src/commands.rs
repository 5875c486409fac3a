//! Commands typed at the prompt, mapped onto flow operations.

use shared::domain::ScreenId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Search { query: String },
    Select { choice: SelectChoice },
    ClickOutside,
    Go { screen: ScreenId },
    Back,
    Forward,
    Hash { token: String },
    SetDonation { key: String, value: String },
    SetDetail { key: String, value: String },
    Submit,
    ToggleInfo,
    ReportIssue,
    Restart,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectChoice {
    /// 1-based position in the last result list.
    Index(usize),
    Name(String),
}

impl UiCommand {
    pub fn name(&self) -> &'static str {
        match self {
            UiCommand::Search { .. } => "search",
            UiCommand::Select { .. } => "select",
            UiCommand::ClickOutside => "outside",
            UiCommand::Go { .. } => "go",
            UiCommand::Back => "back",
            UiCommand::Forward => "forward",
            UiCommand::Hash { .. } => "hash",
            UiCommand::SetDonation { .. } => "set",
            UiCommand::SetDetail { .. } => "detail",
            UiCommand::Submit => "submit",
            UiCommand::ToggleInfo => "info",
            UiCommand::ReportIssue => "report",
            UiCommand::Restart => "restart",
            UiCommand::Status => "status",
            UiCommand::Help => "help",
            UiCommand::Quit => "quit",
        }
    }
}

pub const HELP: &str = "\
commands:
  search <text>          filter the church directory
  select <n|name>        pick a result (advances to the form)
  outside                click outside the search box
  go <1-4>               navigate to a screen
  back | forward         browser history navigation
  hash <fragment>        simulate a location change, e.g. #screen2
  set <field> <amount>   fill a donation field
  detail <field> <text>  fill full_name, church_member or mpesa_number
  submit                 submit the donation
  info                   toggle the expandable info section
  report                 report an issue
  restart                start over
  status                 show flow state
  quit";

pub fn parse_command(line: &str) -> Result<UiCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => UiCommand::Search {
            query: rest.to_string(),
        },
        "select" => {
            if rest.is_empty() {
                return Err("select needs a result number or church name".into());
            }
            let choice = match rest.parse::<usize>() {
                Ok(index) if index > 0 => SelectChoice::Index(index),
                Ok(_) => return Err("result numbers start at 1".into()),
                Err(_) => SelectChoice::Name(rest.to_string()),
            };
            UiCommand::Select { choice }
        }
        "outside" => UiCommand::ClickOutside,
        "go" => {
            let screen = rest
                .parse::<u8>()
                .ok()
                .and_then(ScreenId::from_number)
                .ok_or_else(|| format!("unknown screen '{rest}', expected 1-4"))?;
            UiCommand::Go { screen }
        }
        "back" => UiCommand::Back,
        "forward" => UiCommand::Forward,
        "hash" => UiCommand::Hash {
            token: rest.to_string(),
        },
        "set" | "detail" => {
            let (key, value) = rest
                .split_once(char::is_whitespace)
                .map(|(key, value)| (key.to_string(), value.trim().to_string()))
                .unwrap_or_else(|| (rest.to_string(), String::new()));
            if key.is_empty() {
                return Err(format!("{verb} needs a field name"));
            }
            if verb.eq_ignore_ascii_case("set") {
                UiCommand::SetDonation { key, value }
            } else {
                UiCommand::SetDetail { key, value }
            }
        }
        "submit" => UiCommand::Submit,
        "info" => UiCommand::ToggleInfo,
        "report" => UiCommand::ReportIssue,
        "restart" => UiCommand::Restart,
        "status" => UiCommand::Status,
        "help" | "?" => UiCommand::Help,
        "quit" | "exit" => UiCommand::Quit,
        "" => return Err("empty command".into()),
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(command)
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
