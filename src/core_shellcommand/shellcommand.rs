/// A trimmed, non-empty command line from an authenticated client.
///
/// Built-ins are matched in a fixed order and the first match wins; anything
/// else is handed to the shell verbatim.
#[derive(Eq, PartialEq, Debug)]
pub enum ShellCommand<'a> {
    Exit,
    Help,
    Who,
    Stats,
    Broadcast(&'a str),
    Upload(&'a str),
    Download(&'a str),
    Cd(&'a str),
    Exec(&'a str),
}

impl<'a> ShellCommand<'a> {
    pub fn parse(cmd: &'a str) -> ShellCommand<'a> {
        match cmd {
            "exit" => return ShellCommand::Exit,
            "help" => return ShellCommand::Help,
            "who" => return ShellCommand::Who,
            "stats" => return ShellCommand::Stats,
            _ => {}
        }

        if let Some(msg) = cmd.strip_prefix("broadcast ") {
            ShellCommand::Broadcast(msg)
        } else if let Some(args) = cmd.strip_prefix("UPLOAD ") {
            ShellCommand::Upload(args)
        } else if let Some(args) = cmd.strip_prefix("DOWNLOAD ") {
            ShellCommand::Download(args)
        } else if let Some(dir) = cmd.strip_prefix("cd ") {
            ShellCommand::Cd(dir)
        } else {
            ShellCommand::Exec(cmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_builtins() {
        assert_eq!(ShellCommand::parse("exit"), ShellCommand::Exit);
        assert_eq!(ShellCommand::parse("help"), ShellCommand::Help);
        assert_eq!(ShellCommand::parse("who"), ShellCommand::Who);
        assert_eq!(ShellCommand::parse("stats"), ShellCommand::Stats);
        // Only exact matches are built-ins
        assert_eq!(ShellCommand::parse("exit now"), ShellCommand::Exec("exit now"));
        assert_eq!(ShellCommand::parse("EXIT"), ShellCommand::Exec("EXIT"));
    }

    #[test]
    fn test_prefixed_builtins() {
        assert_eq!(
            ShellCommand::parse("broadcast hello all"),
            ShellCommand::Broadcast("hello all")
        );
        assert_eq!(
            ShellCommand::parse("UPLOAD a.txt 12"),
            ShellCommand::Upload("a.txt 12")
        );
        assert_eq!(
            ShellCommand::parse("DOWNLOAD a.txt"),
            ShellCommand::Download("a.txt")
        );
        assert_eq!(ShellCommand::parse("cd /tmp"), ShellCommand::Cd("/tmp"));
    }

    #[test]
    fn test_prefix_without_argument_goes_to_shell() {
        assert_eq!(ShellCommand::parse("cd"), ShellCommand::Exec("cd"));
        assert_eq!(ShellCommand::parse("broadcast"), ShellCommand::Exec("broadcast"));
        assert_eq!(ShellCommand::parse("upload a b"), ShellCommand::Exec("upload a b"));
    }
}
