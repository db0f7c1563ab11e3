//! Work-done progress for workspace indexing.

use tower_lsp::lsp_types::notification::Progress;
use tower_lsp::lsp_types::request::WorkDoneProgressCreate;
use tower_lsp::lsp_types::{
    ProgressParams, ProgressParamsValue, ProgressToken, WorkDoneProgress, WorkDoneProgressBegin,
    WorkDoneProgressCreateParams, WorkDoneProgressEnd, WorkDoneProgressReport,
};
use tower_lsp::Client;

/// Progress of one indexing run. Reports are throttled to whole percents.
pub(crate) struct IndexProgress {
    token: Option<ProgressToken>,
    total: usize,
    last_percent: u32,
}

impl IndexProgress {
    /// Starts a progress bar if the client supports one.
    pub(crate) async fn start(client: &Client, supported: bool, title: String, total: usize) -> Self {
        let token = if supported {
            create_token(client, title, total).await
        } else {
            None
        };
        Self {
            token,
            total,
            last_percent: 0,
        }
    }

    pub(crate) async fn report(&mut self, client: &Client, processed: usize) {
        let Some(token) = &self.token else {
            return;
        };
        if self.total == 0 {
            return;
        }
        let percent = u32::try_from(processed * 100 / self.total).unwrap_or(100);
        if percent <= self.last_percent && processed < self.total {
            return;
        }
        self.last_percent = percent;
        let report = WorkDoneProgressReport {
            cancellable: Some(false),
            message: Some(format!("{processed}/{} files", self.total)),
            percentage: Some(percent),
        };
        let _ = client
            .send_notification::<Progress>(ProgressParams {
                token: token.clone(),
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::Report(report)),
            })
            .await;
    }

    pub(crate) async fn end(self, client: &Client, message: String) {
        let Some(token) = self.token else {
            return;
        };
        let end = WorkDoneProgressEnd {
            message: Some(message),
        };
        let _ = client
            .send_notification::<Progress>(ProgressParams {
                token,
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(end)),
            })
            .await;
    }
}

async fn create_token(client: &Client, title: String, total: usize) -> Option<ProgressToken> {
    let token = ProgressToken::String("gml-lsp-index".to_string());
    let params = WorkDoneProgressCreateParams {
        token: token.clone(),
    };
    if client
        .send_request::<WorkDoneProgressCreate>(params)
        .await
        .is_err()
    {
        return None;
    }

    let begin = WorkDoneProgressBegin {
        title,
        cancellable: Some(false),
        message: Some(format!("0/{total} files")),
        percentage: Some(0),
    };
    let _ = client
        .send_notification::<Progress>(ProgressParams {
            token: token.clone(),
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(begin)),
        })
        .await;
    Some(token)
}
