//! Requests for the collections and configs admin APIs

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use bytes::Bytes;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

use crate::engine::SolrRequest;
use crate::error::{SolrError, SolrResult};
use crate::queries::params::ParamList;

const CONFIGS_PATH: &str = "/solr/admin/configs";
const COLLECTIONS_PATH: &str = "/solr/admin/collections";

fn action(action: &str, name: Option<&str>) -> ParamList {
    let mut params = ParamList::new();
    params.push("action", action);
    params.push_opt("name", name);
    params
}

pub(crate) fn upload_config(name: &str, archive: Bytes) -> SolrRequest {
    SolrRequest::post_binary(
        CONFIGS_PATH,
        action("UPLOAD", Some(name)),
        archive,
        "application/octet-stream",
    )
}

pub(crate) fn list_configs() -> SolrRequest {
    SolrRequest::get(CONFIGS_PATH, action("LIST", None))
}

pub(crate) fn delete_config(name: &str) -> SolrRequest {
    SolrRequest::get(CONFIGS_PATH, action("DELETE", Some(name)))
}

pub(crate) fn create_collection(
    name: &str,
    config: &str,
    shards: usize,
    replication_factor: usize,
) -> SolrRequest {
    let mut params = action("CREATE", Some(name));
    params.push("numShards", shards.to_string());
    params.push("replicationFactor", replication_factor.to_string());
    params.push("collection.configName", config);
    SolrRequest::get(COLLECTIONS_PATH, params)
}

pub(crate) fn list_collections() -> SolrRequest {
    SolrRequest::get(COLLECTIONS_PATH, action("LIST", None))
}

pub(crate) fn delete_collection(name: &str) -> SolrRequest {
    SolrRequest::get(COLLECTIONS_PATH, action("DELETE", Some(name)))
}

pub(crate) fn create_alias(name: &str, collections: &[String]) -> SolrRequest {
    let mut params = action("CREATEALIAS", Some(name));
    params.push("collections", collections.join(","));
    SolrRequest::get(COLLECTIONS_PATH, params)
}

pub(crate) fn list_aliases() -> SolrRequest {
    SolrRequest::get(COLLECTIONS_PATH, action("LISTALIASES", None))
}

pub(crate) fn delete_alias(name: &str) -> SolrRequest {
    SolrRequest::get(COLLECTIONS_PATH, action("DELETEALIAS", Some(name)))
}

/// Read a config set for upload. A directory is zipped in memory with entries
/// relative to it. Any other file is assumed to already be a zip archive.
pub fn read_config_archive(path: &Path) -> SolrResult<Bytes> {
    if !path.exists() {
        return Err(SolrError::ConfigError(format!(
            "config path {} does not exist",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Ok(Bytes::from(fs::read(path)?));
    }

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| SolrError::IoError(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(path)
            .map_err(|e| SolrError::ConfigError(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        // Zip entries always use forward slashes
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            zip.write_all(&fs::read(entry.path())?)?;
        }
    }
    let cursor = zip.finish()?;
    Ok(Bytes::from(cursor.into_inner()))
}
