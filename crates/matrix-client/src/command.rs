//! Line commands understood by the terminal front end.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    Quit,
    Go(String),
    Toggle,
    Username(String),
    Password(String),
    Submit,
    Login { username: String, password: String },
    Register { username: String, password: String },
    Post(String),
    Refresh,
    Users,
    Open(String),
    Back,
    Logout,
}

pub const HELP: &str = "\
commands:
  go <path>                  navigate to /, /users or /profile/<name>
  login <user> <password>    sign in
  register <user> <password> create an account and sign in
  username <u> | password <p> | toggle | submit
                             fill in and submit the sign-in form
  post <text>                post on the wall being viewed
  refresh                    reload the current screen
  users                      open the user directory
  open <n|username>          open a user (directory) or a post's author (wall)
  back                       from the directory, back to your wall
  logout                     sign out (your own wall only)
  help | quit";

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "go" => Command::Go(required(rest, "go <path>")?),
        "toggle" => Command::Toggle,
        "username" => Command::Username(rest.to_string()),
        "password" => Command::Password(rest.to_string()),
        "submit" => Command::Submit,
        "login" => {
            let (username, password) = credentials(rest, "login <user> <password>")?;
            Command::Login { username, password }
        }
        "register" => {
            let (username, password) = credentials(rest, "register <user> <password>")?;
            Command::Register { username, password }
        }
        // The text goes through untouched; blank posts are the screen's call.
        "post" => Command::Post(rest.to_string()),
        "refresh" => Command::Refresh,
        "users" => Command::Users,
        "open" => Command::Open(required(rest, "open <n|username>")?),
        "back" => Command::Back,
        "logout" => Command::Logout,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(cmd)
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest.to_string())
    }
}

fn credentials(rest: &str, usage: &str) -> Result<(String, String), String> {
    match rest.split_once(char::is_whitespace) {
        Some((user, password)) if !password.trim().is_empty() => {
            Ok((user.to_string(), password.trim().to_string()))
        }
        _ => Err(format!("usage: {}", usage)),
    }
}
