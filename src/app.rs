//! Wiring: turns [`Settings`] into concrete clients and runs the pipeline.

use logship_core::config::{Settings, SourceKind};
use logship_core::{Pipeline, PipelineSettings, Reporter, RunReport};
use logship_feeds::{LocalFs, OpenSearch, WebHdfs};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run one ingestion with the clients `settings` describe.
pub async fn run<R: Reporter>(settings: &Settings, reporter: R, cancel: CancellationToken) -> RunReport {
    let pipeline = PipelineSettings::from_settings(settings);
    let store = OpenSearch::from_settings(&settings.sink);
    info!(
        source = ?settings.source.kind,
        path = %settings.source.path,
        sink = %settings.sink.url,
        index = %settings.sink.index,
        refresh = settings.sink.refresh.as_query_value(),
        "configured"
    );

    match settings.source.kind {
        SourceKind::Webhdfs => {
            let fs = WebHdfs::from_settings(&settings.source);
            Pipeline::new(fs, store, reporter, pipeline)
                .with_cancellation(cancel)
                .run()
                .await
        }
        SourceKind::File => {
            Pipeline::new(LocalFs::new(), store, reporter, pipeline)
                .with_cancellation(cancel)
                .run()
                .await
        }
    }
}
