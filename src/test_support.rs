use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, OnceLock};

static ENV_GUARD: OnceLock<Mutex<()>> = OnceLock::new();

fn apply(key: &str, value: Option<&str>) {
    #[allow(unused_unsafe)]
    unsafe {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}

/// Runs `f` with `key` set to `value`, or unset when `value` is `None`.
///
/// The process environment is shared across the harness's test threads,
/// so every override serializes through one lock. The prior value is
/// restored afterwards, also when `f` panics.
pub(crate) fn with_env_var<T>(key: &str, value: Option<&str>, f: impl FnOnce() -> T) -> T {
    let _lock = ENV_GUARD
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let previous: Option<OsString> = env::var_os(key);
    apply(key, value);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    #[allow(unused_unsafe)]
    unsafe {
        match previous {
            Some(original) => env::set_var(key, original),
            None => env::remove_var(key),
        }
    }

    match outcome {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

#[cfg(test)]
mod test_support_tests {
    use super::with_env_var;
    use std::env;

    #[test]
    fn previous_value_is_restored() {
        env::set_var("MECAB_RS_RESTORE_CHECK", "before");
        with_env_var("MECAB_RS_RESTORE_CHECK", Some("during"), || {
            assert_eq!(env::var("MECAB_RS_RESTORE_CHECK").unwrap(), "during");
        });
        assert_eq!(env::var("MECAB_RS_RESTORE_CHECK").unwrap(), "before");
        env::remove_var("MECAB_RS_RESTORE_CHECK");
    }

    #[test]
    fn none_unsets_the_variable() {
        env::set_var("MECAB_RS_UNSET_CHECK", "before");
        with_env_var("MECAB_RS_UNSET_CHECK", None, || {
            assert!(env::var_os("MECAB_RS_UNSET_CHECK").is_none());
        });
        assert_eq!(env::var("MECAB_RS_UNSET_CHECK").unwrap(), "before");
        env::remove_var("MECAB_RS_UNSET_CHECK");
    }
}
