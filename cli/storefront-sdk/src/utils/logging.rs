#[cfg(any(test, feature = "tests"))]
pub mod test_helpers {
    use std::fmt::Display;
    use std::sync::{Arc, Mutex};

    /// Collects everything a subscriber writes, for asserting on log output.
    #[derive(Clone, Debug, Default)]
    pub struct CollectingWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl Display for CollectingWriter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let buffer = self.buffer.lock().unwrap();
            write!(f, "{}", String::from_utf8_lossy(&buffer))
        }
    }

    impl<'w> tracing_subscriber::fmt::MakeWriter<'w> for CollectingWriter {
        type Writer = <Mutex<Vec<u8>> as tracing_subscriber::fmt::MakeWriter<'w>>::Writer;

        fn make_writer(&'w self) -> Self::Writer {
            (*self.buffer).make_writer()
        }
    }

    /// A subscriber logging `info` and above into the returned writer.
    ///
    /// Install it with [tracing::subscriber::set_default] for the scope of a
    /// test.
    pub fn test_subscriber() -> (impl tracing::Subscriber, CollectingWriter) {
        let writer = CollectingWriter::default();

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_max_level(tracing::Level::INFO)
            .compact()
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_ansi(false)
            .finish();

        (subscriber, writer)
    }
}
