use once_cell::sync::OnceCell;
use tracing::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;

static LOGGER_HANDLE: OnceCell<Handle<EnvFilter, Registry>> = OnceCell::new();

/// The log filter for a verbosity level, `$RUST_LOG` takes precedence.
pub(crate) fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        // Show only errors
        Verbosity::Quiet => "off,storefront=error,storefront_sdk=error,storefront_catalog=error",
        // Only show warnings
        Verbosity::Verbose(0) => "off,storefront=warn,storefront_sdk=warn,storefront_catalog=warn",
        // Show our own info logs
        Verbosity::Verbose(1) => "off,storefront=info,storefront_sdk=info,storefront_catalog=info",
        // Also show debug from our libraries
        Verbosity::Verbose(2) => {
            "off,storefront=debug,storefront_sdk=debug,storefront_catalog=debug"
        },
        // Also show trace from our libraries and the HTTP stack
        Verbosity::Verbose(3) => "debug,storefront=trace,storefront_sdk=trace,storefront_catalog=trace",
        Verbosity::Verbose(_) => "trace",
    }
}

/// Install the stderr logger, or update its filter if already installed.
pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let log_filter = log_filter(verbosity.unwrap_or_default());

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        let (subscriber, reload_handle) = create_registry_and_filter_reload_handle();
        subscriber.init();
        reload_handle
    });

    update_filters(filter_handle, log_filter);
}

fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

fn create_registry_and_filter_reload_handle() -> (
    impl SubscriberInitExt,
    Handle<EnvFilter, Registry>,
) {
    // replaced by the verbosity filter right after installation
    let filter = EnvFilter::new("warn");
    let (filter, filter_reload_handle) = tracing_subscriber::reload::Layer::new(filter);
    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    let registry = tracing_subscriber::registry().with(log_layer);

    (registry, filter_reload_handle)
}
