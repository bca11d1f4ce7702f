//! Thin instrumentation layer over [`puffin`].
//!
//! Every loading and upload step in the engine opens a scope through
//! [`profile_function!`] or [`profile_scope!`]. Scopes cost a single atomic
//! load while profiling is disabled.

pub use puffin;

/// Turns scope collection on or off for the whole process.
pub fn set_enabled(enabled: bool) {
    puffin::set_scopes_on(enabled);
}

pub fn is_enabled() -> bool {
    puffin::are_scopes_on()
}

/// Marks the end of a frame so the collected scopes are grouped per frame.
pub fn new_frame() {
    profile_function!();
    puffin::GlobalProfiler::lock().new_frame();
}

#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        $crate::puffin::profile_scope!($name);
    };
    ($name:expr, $data:expr) => {
        $crate::puffin::profile_scope!($name, $data);
    };
}

#[macro_export]
macro_rules! profile_function {
    () => {
        $crate::puffin::profile_function!();
    };
    ($data:expr) => {
        $crate::puffin::profile_function!($data);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_scope_collection() {
        set_enabled(true);
        assert!(is_enabled());
        {
            profile_scope!("toggles_scope_collection");
        }
        new_frame();

        set_enabled(false);
        assert!(!is_enabled());
    }
}
