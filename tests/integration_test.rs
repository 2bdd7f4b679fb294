//! Integration tests for the token filter.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use token_filter::config::{
    ConfigSource, ContextResolver, ContextSource, Diagnostic, DiagnosticKind, Environment, Reporter,
};
use token_filter::core::{Context, Delimiter, TokenPattern};
use token_filter::error::{Error, FilterError};
use token_filter::filter::{FilterOptions, FilterPipe, Mode, TokenFilter, replace_tokens};
use tokio::io::AsyncWriteExt;

fn fixture(name: &str) -> ConfigSource {
    ConfigSource::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name),
    )
}

/// Keeps reported diagnostics for assertions.
#[derive(Debug, Clone, Default)]
struct RecordingReporter {
    seen: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingReporter {
    fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen.lock().expect("reporter lock").clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        self.seen
            .lock()
            .expect("reporter lock")
            .push(diagnostic.clone());
    }
}

/// Feeds `chunks` through a filter and finishes it.
fn filter_chunks(context: Context, options: FilterOptions, chunks: &[&[u8]]) -> Vec<u8> {
    let mut filter = TokenFilter::new(context, options).expect("filter");
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(filter.consume(chunk).expect("consume"));
    }
    out.extend(filter.finish().expect("finish"));
    out
}

mod resolver_tests {
    use super::*;

    #[tokio::test]
    async fn test_json_fixture() {
        let context = ContextResolver::new()
            .resolve(&[fixture("config.json")])
            .await
            .expect("resolve");
        assert_eq!(context.get("foo"), Some("bar"));
        assert_eq!(context.len(), 1);
    }

    #[tokio::test]
    async fn test_properties_fixture_with_interpolation() {
        let env = Environment::new().with("basedir", "/srv");
        let context = ContextResolver::new()
            .with_environment(env)
            .resolve(&[fixture("config.properties")])
            .await
            .expect("resolve");
        assert_eq!(context.get("foo"), Some("bar"));
        assert_eq!(context.get("greeting"), Some("Hello, World"));
        assert_eq!(context.get("root"), Some("/srv/site"));
    }

    #[tokio::test]
    async fn test_unknown_kind_contributes_nothing() {
        let reporter = RecordingReporter::default();
        let context = ContextResolver::new()
            .with_reporter(Arc::new(reporter.clone()))
            .resolve(&[fixture("config.json"), fixture("config.yaml")])
            .await
            .expect("resolve");

        assert_eq!(context.get("foo"), Some("bar"));
        let diagnostics = reporter.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].path.ends_with("config.yaml"));
        assert!(matches!(
            diagnostics[0].kind,
            DiagnosticKind::UnknownSourceKind { .. }
        ));
    }

    #[tokio::test]
    async fn test_only_unknown_kinds_resolve_empty() {
        let reporter = RecordingReporter::default();
        let context = ContextResolver::new()
            .with_reporter(Arc::new(reporter.clone()))
            .resolve(&[fixture("config.yaml")])
            .await
            .expect("resolve");
        assert!(context.is_empty());
        assert_eq!(reporter.diagnostics().len(), 1);
    }
}

mod filter_tests {
    use super::*;

    fn city(value: &str) -> Context {
        [("city", value)].into_iter().collect()
    }

    #[test]
    fn test_token_split_across_chunks() {
        let out = filter_chunks(
            city("Topeka"),
            FilterOptions::default(),
            &[b"Hello, @ci", b"ty@!"],
        );
        assert_eq!(out, b"Hello, Topeka!");
    }

    #[test]
    fn test_unpaired_delimiters() {
        let out = filter_chunks(
            city("Topeka"),
            FilterOptions::default(),
            &[b"Lunch @ 12pm, ", b"dinner @ 6pm."],
        );
        assert_eq!(out, b"Lunch @ 12pm, dinner @ 6pm.");
    }

    #[test]
    fn test_custom_delimiter() {
        let options = FilterOptions::new().with_delimiter(Delimiter::new("__").expect("delimiter"));
        let out = filter_chunks(city("Medicine Hat"), options, &[b"Hello, __city__!"]);
        assert_eq!(out, b"Hello, Medicine Hat!");
    }

    #[test]
    fn test_trailing_fragment_flushed_at_end() {
        let out = filter_chunks(city("Topeka"), FilterOptions::default(), &[b"see @ci"]);
        assert_eq!(out, b"see @ci");
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        assert!(matches!(
            Delimiter::new(""),
            Err(FilterError::EmptyDelimiter)
        ));
        assert!(matches!(
            "".parse::<Delimiter>(),
            Err(FilterError::EmptyDelimiter)
        ));
    }

    #[test]
    fn test_mode_transitions() {
        let mut filter = TokenFilter::awaiting_context(FilterOptions::default()).expect("filter");
        assert_eq!(filter.mode(), Mode::AwaitingContext);
        filter.consume(b"@city@").expect("queue");
        let drained = filter
            .context_ready(Ok(city("Topeka")))
            .expect("context ready");
        assert_eq!(filter.mode(), Mode::Filtering);
        assert_eq!(drained, b"Topeka");
        assert!(filter.finish().expect("finish").is_empty());
    }

    #[test]
    fn test_failed_mode_rejects() {
        let mut filter = TokenFilter::awaiting_context(FilterOptions::default()).expect("filter");
        let failure: Error = token_filter::error::ConfigError::ResolverFailed("boom".into()).into();
        assert!(filter.context_ready(Err(failure)).is_err());
        assert_eq!(filter.mode(), Mode::Failed);
        assert!(matches!(
            filter.consume(b"x"),
            Err(Error::Filter(FilterError::Rejected))
        ));
    }
}

mod pipe_tests {
    use super::*;

    #[tokio::test]
    async fn test_pipe_from_fixture_files() {
        let pipe = FilterPipe::new(
            ContextSource::Files(vec![fixture("config.json"), fixture("config.yaml")]),
            ContextResolver::new().with_reporter(Arc::new(RecordingReporter::default())),
            FilterOptions::default(),
        )
        .expect("pipe");

        let template = fixture("template.txt").path;
        let input = std::fs::read(template).expect("template");
        let mut out = Vec::new();
        pipe.run(input.as_slice(), &mut out).await.expect("run");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "foo is bar, @missing@ stays, email me @ home.\n"
        );
    }

    #[tokio::test]
    async fn test_pipe_streams_through_duplex() {
        let context: Context = [("city", "Topeka")].into_iter().collect();
        let options = FilterOptions::new().with_high_water_mark(3);
        let pipe = FilterPipe::with_context(context, options).expect("pipe");

        let (mut input_tx, input_rx) = tokio::io::duplex(8);
        let (output_tx, mut output_rx) = tokio::io::duplex(8);

        let writer = tokio::spawn(async move {
            input_tx
                .write_all(b"Hello, @city@! Bye, @city@.")
                .await
                .expect("write");
        });
        let reader = tokio::spawn(async move {
            let mut out = Vec::new();
            tokio::io::AsyncReadExt::read_to_end(&mut output_rx, &mut out)
                .await
                .expect("read");
            out
        });

        let stats = pipe.run(input_rx, output_tx).await.expect("run");
        writer.await.expect("writer task");
        let out = reader.await.expect("reader task");

        assert_eq!(out, b"Hello, Topeka! Bye, Topeka.");
        assert_eq!(stats.bytes_in, 27);
        assert_eq!(stats.bytes_out, out.len());
    }

    #[tokio::test]
    async fn test_pipe_timeout_fails_terminally() {
        let pipe = FilterPipe::new(
            ContextSource::Files(vec![fixture("config.json")]),
            ContextResolver::new().with_timeout(std::time::Duration::ZERO),
            FilterOptions::default(),
        )
        .expect("pipe");

        let mut out = Vec::new();
        let result = pipe.run(&b"@foo@"[..], &mut out).await;
        assert!(matches!(
            result,
            Err(Error::Filter(FilterError::ContextFailed { .. }))
        ));
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Splits `input` at the given (unsorted, possibly out of range) points.
    fn split_at_points(input: &[u8], points: &[usize]) -> Vec<Vec<u8>> {
        let mut cuts: Vec<usize> = points
            .iter()
            .map(|p| p % (input.len() + 1))
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut chunks = Vec::new();
        let mut start = 0;
        for cut in cuts {
            chunks.push(input[start..cut].to_vec());
            start = cut;
        }
        chunks.push(input[start..].to_vec());
        chunks
    }

    fn context() -> Context {
        [("a", "1"), ("city", "Topeka"), ("k_2", "@nested@"), ("x", "")]
            .into_iter()
            .collect()
    }

    fn check_chunking(delimiter: &str, text: &str, points: &[usize]) -> Result<(), TestCaseError> {
        let delimiter = Delimiter::new(delimiter).expect("delimiter");
        let pattern = TokenPattern::new(delimiter.clone()).expect("pattern");
        let expected = replace_tokens(&pattern, &context(), text);

        let chunks = split_at_points(text.as_bytes(), points);
        let chunk_refs: Vec<&[u8]> = chunks.iter().map(Vec::as_slice).collect();
        let out = filter_chunks(
            context(),
            FilterOptions::new().with_delimiter(delimiter),
            &chunk_refs,
        );
        prop_assert_eq!(String::from_utf8(out).expect("utf8"), expected);
        Ok(())
    }

    proptest! {
        #[test]
        fn output_independent_of_chunking_at(
            text in "[a@ck_x2 é.]{0,40}",
            points in prop::collection::vec(any::<usize>(), 0..8),
        ) {
            check_chunking("@", &text, &points)?;
        }

        #[test]
        fn output_independent_of_chunking_word_delimiter(
            text in "[a_ck2x é.]{0,40}",
            points in prop::collection::vec(any::<usize>(), 0..8),
        ) {
            check_chunking("__", &text, &points)?;
        }

        #[test]
        fn output_independent_of_chunking_mixed_delimiter(
            text in "[<%>a x.]{0,40}",
            points in prop::collection::vec(any::<usize>(), 0..8),
        ) {
            check_chunking("<%", &text, &points)?;
        }

        #[test]
        fn empty_context_is_identity(
            bytes in prop::collection::vec(any::<u8>(), 0..64),
            points in prop::collection::vec(any::<usize>(), 0..8),
        ) {
            let chunks = split_at_points(&bytes, &points);
            let chunk_refs: Vec<&[u8]> = chunks.iter().map(Vec::as_slice).collect();
            let out = filter_chunks(Context::new(), FilterOptions::default(), &chunk_refs);
            prop_assert_eq!(out, bytes);
        }

        #[test]
        fn text_without_delimiter_is_unchanged(
            text in "[a-z .,é]{0,64}",
            points in prop::collection::vec(any::<usize>(), 0..8),
        ) {
            let chunks = split_at_points(text.as_bytes(), &points);
            let chunk_refs: Vec<&[u8]> = chunks.iter().map(Vec::as_slice).collect();
            let out = filter_chunks(context(), FilterOptions::default(), &chunk_refs);
            prop_assert_eq!(String::from_utf8(out).expect("utf8"), text);
        }
    }
}
