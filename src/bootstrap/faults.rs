use std::panic::PanicHookInfo;
use std::sync::Once;

static INSTALL: Once = Once::new();

/// Log every panic through tracing instead of letting it vanish on stderr.
///
/// Request handlers are additionally wrapped in a catch-panic layer and
/// spawned tasks are contained by the runtime, so a logged panic does not
/// bring the server down.
pub fn install_panic_hook() {
    INSTALL.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|location| location.to_string())
                .unwrap_or_else(|| "unknown".into());

            tracing::error!(
                thread = thread.name().unwrap_or("<unnamed>"),
                %location,
                "UNCAUGHT: {}",
                panic_message(info)
            );
        }));
    });
}

fn panic_message<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    let payload = info.payload();

    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
