//! log macros; defmt on firmware, the `log` facade on host, nothing otherwise
#![allow(unused_macros)]

macro_rules! emit {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(feature = "log")]
            ::log::$level!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "log")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => { emit!(trace, $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { emit!(debug, $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { emit!(info, $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { emit!(warn, $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { emit!(error, $($arg)*) };
}
