//! `frame://` handler: serves decoded frames out of the [`FrameStore`].

use crate::monitor::store::{frame_id, FrameStore};
use std::borrow::Cow;
use tauri::http::{header, Request, Response, StatusCode};

pub fn respond(store: &FrameStore, request: &Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let path = request.uri().path();
    let Some(frame) = frame_id(path).and_then(|id| store.get(id)) else {
        log::debug!("[FRAME] No frame at {}", request.uri());
        return Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Cow::Borrowed(&[][..]))
            .unwrap_or_default();
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, frame.mime)
        .header(header::CACHE_CONTROL, "no-store")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Cow::Owned(frame.bytes.to_vec()))
        .unwrap_or_default()
}
