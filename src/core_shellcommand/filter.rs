use crate::constants::BANNED_FOR_USER;

/// True if `cmd` contains any substring banned for the `user` role.
///
/// This is a plain substring match over the whole command line, so it also
/// catches harmless text such as a file name containing "rm ". It is a
/// guardrail against accidents, not a sandbox.
pub fn is_dangerous_for_user(cmd: &str) -> bool {
    BANNED_FOR_USER.iter().any(|banned| cmd.contains(banned))
}
