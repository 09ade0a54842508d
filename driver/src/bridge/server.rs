use crate::bridge::model::VisualizationModel;
use anyhow::Context;
use log::info;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::runtime::Builder;
use tokio::signal;
use warp::{http::StatusCode, Filter};

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Read-only HTTP surface over one rendered model.
pub struct BridgeServer {
    model: Arc<VisualizationModel>,
}

impl BridgeServer {
    pub fn new(model: VisualizationModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let model = self.model.clone();
        let model_filter = warp::any().map(move || model.clone());

        let view_route = warp::path!("view")
            .and(warp::get())
            .and(model_filter.clone())
            .map(|model: Arc<VisualizationModel>| warp::reply::json(&model.view));

        let summary_route = warp::path!("summary")
            .and(warp::get())
            .and(model_filter.clone())
            .map(|model: Arc<VisualizationModel>| warp::reply::json(&model.summary));

        let frame_route = warp::path!("frames" / usize)
            .and(warp::get())
            .and(model_filter)
            .map(|index: usize, model: Arc<VisualizationModel>| match model.frame(index) {
                Some(frame) => warp::reply::with_status(warp::reply::json(frame), StatusCode::OK),
                None => warp::reply::with_status(
                    warp::reply::json(&json!({ "error": format!("no frame {index}") })),
                    StatusCode::NOT_FOUND,
                ),
            });

        view_route.or(summary_route).or(frame_route)
    }

    /// Serves until Ctrl+C.
    pub fn serve(&self, address: SocketAddr) -> anyhow::Result<()> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for the HTTP bridge")?;
        let routes = self.routes();
        runtime.block_on(async move {
            let (bound, server) = warp::serve(routes)
                .try_bind_with_graceful_shutdown(address, async {
                    signal::ctrl_c().await.ok();
                })
                .with_context(|| format!("binding HTTP bridge on {address}"))?;
            info!("HTTP bridge listening on http://{}", bound);
            server.await;
            Ok::<(), anyhow::Error>(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::model::SessionSummary;
    use migrationcore::session::{Session, SessionEvent, ViewMode};

    fn server(view_mode: ViewMode) -> BridgeServer {
        let mut session = Session::default();
        session.apply(SessionEvent::LoadSample).unwrap();
        session.apply(SessionEvent::SetViewMode(view_mode)).unwrap();
        BridgeServer::new(VisualizationModel {
            summary: SessionSummary::from_session(&session),
            view: session.rendered().cloned(),
        })
    }

    #[tokio::test]
    async fn view_route_returns_static_artifact() {
        let routes = server(ViewMode::Static).routes();
        let response = warp::test::request()
            .method("GET")
            .path("/view")
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["mode"], "static");
        assert_eq!(body["artifact"]["layers"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn frame_route_serves_frames_and_404s() {
        let routes = server(ViewMode::Animated).routes();
        let found = warp::test::request()
            .path("/frames/0")
            .reply(&routes)
            .await;
        assert_eq!(found.status(), StatusCode::OK);
        let missing = warp::test::request()
            .path("/frames/9999")
            .reply(&routes)
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn summary_route_reports_counts() {
        let routes = server(ViewMode::Static).routes();
        let response = warp::test::request().path("/summary").reply(&routes).await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["subjects"].as_array().unwrap().len(), 3);
    }
}
