//! Decoding of service response bodies.
//!
//! Successful calls return
//! `<response><task id=".." status=".." resultUrl=".."/></response>`;
//! failed calls return `<error><message>..</message></error>`. Only the
//! attributes the lifecycle needs are read, everything else is ignored.

use crate::task::{Task, TaskStatus};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Prefix of the null GUID; such ids come from caller bugs, never the service.
const NULL_TASK_ID: &str = "00000000-0";

/// True if `id` is (or embeds) the null GUID.
pub fn is_null_task_id(id: &str) -> bool {
    id.contains(NULL_TASK_ID)
}

/// Parse the first `<task>` element of a response body.
pub fn parse_task(xml: &str) -> Result<Task, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"task" => {
                return task_from_element(&e);
            }
            Ok(Event::Eof) => return Err("no <task> element in response".into()),
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            Ok(_) => {}
        }
    }
}

fn task_from_element(e: &BytesStart<'_>) -> Result<Task, String> {
    let mut id = None;
    let mut status = None;
    let mut result_url = None;
    let mut estimate = None;
    let mut error = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| format!("bad <task> attribute: {e}"))?;
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad <task> attribute value: {e}"))?
            .into_owned();
        match attr.key.as_ref() {
            b"id" => id = Some(value),
            b"status" => status = Some(TaskStatus::parse(&value)),
            b"resultUrl" => result_url = Some(value),
            b"estimatedProcessingTime" => estimate = value.parse::<u64>().ok(),
            b"error" => error = Some(value),
            _ => {}
        }
    }

    let id = id
        .filter(|id| !id.is_empty())
        .ok_or("<task> element has no id")?;
    let status = status.ok_or("<task> element has no status")?;

    let mut task = Task::new(id, status);
    task.estimated_processing_secs = estimate;
    task.error = error.filter(|e| !e.is_empty());
    if let Some(url) = result_url.filter(|u| !u.is_empty()) {
        task = task.with_download_url(url);
    }
    Ok(task)
}

/// Extract the text of `<error><message>` from a failure body, if any.
pub fn parse_error_message(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut in_message = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"message" => in_message = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"message" => in_message = false,
            Ok(Event::Text(t)) if in_message => {
                let text = t.unescape().ok()?.trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}
