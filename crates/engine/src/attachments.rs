//! Materialization of inline attachments into durable URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::warn;

use vanlog_core::Attachment;
use vanlog_remote::RemoteStore;

/// Upload every inline entry, one at a time and in order. A failed upload
/// keeps the original inline entry so no image is ever dropped; entries
/// that are already URLs pass through unchanged.
pub fn process_for_sync(remote: &dyn RemoteStore, attachments: Vec<Attachment>) -> Vec<Attachment> {
    if !attachments.iter().any(Attachment::is_inline) {
        return attachments;
    }

    attachments
        .into_iter()
        .map(|attachment| match attachment {
            Attachment::Inline(data_uri) => match decode_data_uri(&data_uri) {
                Some(bytes) => match remote.upload_blob(&bytes) {
                    Ok(url) => Attachment::Remote(url),
                    Err(e) => {
                        warn!(error = %e, "attachment upload failed, keeping inline copy");
                        Attachment::Inline(data_uri)
                    }
                },
                None => {
                    warn!("attachment data URI is undecodable, keeping inline copy");
                    Attachment::Inline(data_uri)
                }
            },
            url @ Attachment::Remote(_) => url,
        })
        .collect()
}

/// `data:image/jpeg;base64,<payload>` to raw image bytes.
fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let (_, payload) = uri.split_once(',')?;
    STANDARD.decode(payload.as_bytes()).ok()
}
