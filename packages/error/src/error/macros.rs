//! Macros for error creation and handling

/// Create an [`Error`](crate::Error) with a formatted message
///
/// Details follow the message arguments after a `;`.
///
/// ```
/// use strata_error::error;
///
/// let path = "myFile.sh";
/// let e = error!(11, "could not find '{}'", path; "error details", "error hint");
/// assert_eq!(e.message(), "could not find 'myFile.sh'");
/// assert_eq!(e.details(), ["error details", "error hint"]);
/// ```
#[macro_export]
macro_rules! error {
    ($code:expr, $fmt:literal $(, $arg:expr)* $(,)? ; $($detail:expr),+ $(,)?) => {
        $crate::Error::new(
            $code,
            [::std::format!($fmt $(, $arg)*) $(, ::std::string::String::from($detail))+],
        )
    };
    ($code:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::Error::new($code, [::std::format!($fmt $(, $arg)*)])
    };
}

/// Return early with an [`Error`](crate::Error), see [`error!`]
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return ::std::result::Result::Err($crate::error!($($arg)*).into())
    };
}

/// Return early with an [`Error`](crate::Error) unless a condition holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::bail!($($arg)*);
        }
    };
}
