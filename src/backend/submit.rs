use super::form::{Attachment, ThreadValues};
use super::types::{CreateThreadParams, PostContext, StagedFile, SubmitReport};
use super::{Backend, Upload};
use color_eyre::Result;
use futures_util::{stream, StreamExt};

/// Upload every attachment, then create the thread.
///
/// Uploads run at most `backend.concurrency` at a time. A failed upload is logged
/// and left out of the thread's images; it never stops the thread itself from
/// being created. Only a failure of the final persistence call is an error.
pub async fn submit_thread(
    backend: &Backend,
    values: ThreadValues,
    attachments: Vec<Attachment>,
    context: &PostContext,
    path: &str,
) -> Result<SubmitReport> {
    let attachments = upload_all(backend.uploader.as_ref(), attachments, backend.concurrency).await;
    let image = attachments
        .iter()
        .filter_map(|a| a.remote.clone())
        .collect::<Vec<_>>();
    let failed = attachments.len() - image.len();
    log::debug!("uploaded {} images, {failed} failed", image.len());
    backend
        .store
        .create_thread(CreateThreadParams {
            text: values.thread,
            image: image.clone(),
            author: context.account_id.clone(),
            community_id: context.community_id.clone(),
            path: path.to_string(),
        })
        .await?;
    Ok(SubmitReport { image, failed })
}

/// Upload attachments, filling in `remote` for those that got a URL back.
/// The result keeps the input order whatever order the uploads finish in.
pub async fn upload_all(
    uploader: &dyn Upload,
    attachments: Vec<Attachment>,
    concurrency: usize,
) -> Vec<Attachment> {
    stream::iter(attachments)
        .map(|mut attachment| async move {
            attachment.remote = upload_one(uploader, attachment.file.clone()).await;
            attachment
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

async fn upload_one(uploader: &dyn Upload, file: StagedFile) -> Option<String> {
    let name = file.name.clone();
    match uploader.upload(vec![file]).await {
        Ok(output) => {
            let url = output.into_iter().next().and_then(|f| f.file_url);
            if url.is_none() {
                log::warn!("no url returned for {name}");
            }
            url
        }
        Err(e) => {
            log::error!("error uploading image {name}: {e}");
            None
        }
    }
}
