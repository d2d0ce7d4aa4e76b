/// Creates a single text [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use murmur::{Role, mm_msg};
///
/// let message = mm_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.text_content(), "Done.");
/// ```
#[macro_export]
macro_rules! mm_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::system($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::assistant($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use murmur::{Role, mm_messages};
///
/// let messages = mm_messages![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! mm_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::mm_msg!($role => $content)),+]
    };
}
