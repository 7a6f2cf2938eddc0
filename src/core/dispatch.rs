use crate::types::{BoundingBox, ExportParameters, GridResult, RasterProduct};
use std::collections::HashMap;
use std::time::Duration;

/// Export resolution handed to the execution system, in ground units
pub const EXPORT_SCALE: f64 = 25.0;

/// Upper bound on pixels the execution system may materialize
pub const MAX_PIXELS: f64 = 1e13;

/// Pause between creating and starting a submission
const START_DELAY: Duration = Duration::from_millis(100);

/// Fully resolved submission for the external execution system
#[derive(Debug, Clone)]
pub struct ExportTask {
    pub description: String,
    pub asset_id: String,
    pub product: RasterProduct,
    pub pyramiding_policy: HashMap<String, String>,
    pub region: BoundingBox,
    pub scale: f64,
    pub crs: String,
    pub max_pixels: f64,
    pub overwrite: bool,
}

/// The external execution system that persists export jobs.
///
/// Implementations submit the task and return the system's job identifier.
/// Errors propagate unmodified; the pipeline performs no retries.
pub trait ExportBackend {
    fn submit(&self, task: &ExportTask) -> GridResult<String>;
}

/// Submit an assembled export to the backend and return its job id.
///
/// The description is the final path segment of the destination asset id.
/// The external system occasionally drops tasks started immediately after
/// creation, so submission waits a fixed 100 ms first; keep the pause even if
/// it looks removable.
pub fn start_export(backend: &dyn ExportBackend, params: ExportParameters) -> GridResult<String> {
    let description = params
        .asset_id
        .rsplit('/')
        .next()
        .unwrap_or(params.asset_id.as_str())
        .to_string();

    let task = ExportTask {
        description,
        asset_id: params.asset_id,
        product: params.product,
        pyramiding_policy: params.pyramiding_policy,
        region: params.region,
        scale: EXPORT_SCALE,
        crs: params.crs,
        max_pixels: MAX_PIXELS,
        overwrite: params.overwrite,
    };

    std::thread::sleep(START_DELAY);
    let job_id = backend.submit(&task)?;
    log::info!("export '{}' submitted as job {}", task.description, job_id);
    Ok(job_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GridError, ProductMetadata};
    use std::sync::Mutex;

    struct RecordingBackend {
        tasks: Mutex<Vec<ExportTask>>,
    }

    impl ExportBackend for RecordingBackend {
        fn submit(&self, task: &ExportTask) -> GridResult<String> {
            self.tasks
                .lock()
                .map_err(|_| GridError::Backend("poisoned".to_string()))?
                .push(task.clone());
            Ok("JOB42".to_string())
        }
    }

    struct FailingBackend;

    impl ExportBackend for FailingBackend {
        fn submit(&self, _task: &ExportTask) -> GridResult<String> {
            Err(GridError::Backend("quota exceeded".to_string()))
        }
    }

    fn params() -> ExportParameters {
        let bounds = BoundingBox {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 100.0,
            max_y: 100.0,
        };
        ExportParameters {
            asset_id: "LARSE/GEDI/GEDI02_B_002_MONTHLY/007".to_string(),
            product: RasterProduct {
                bands: vec![],
                bounds,
                crs: "EPSG:32610".to_string(),
                scale: EXPORT_SCALE,
                metadata: ProductMetadata {
                    month: 6,
                    year: 2019,
                    version: 1,
                    time_start_ms: 0,
                    time_end_ms: 0,
                    table_asset_ids: vec![],
                },
            },
            pyramiding_policy: HashMap::new(),
            crs: "EPSG:32610".to_string(),
            region: bounds,
            overwrite: false,
        }
    }

    #[test]
    fn test_description_is_asset_basename() {
        let backend = RecordingBackend {
            tasks: Mutex::new(Vec::new()),
        };
        let job_id = start_export(&backend, params()).unwrap();
        assert_eq!(job_id, "JOB42");
        let tasks = backend.tasks.lock().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "007");
        assert_eq!(tasks[0].scale, 25.0);
        assert_eq!(tasks[0].max_pixels, 1e13);
    }

    #[test]
    fn test_backend_errors_propagate_unmodified() {
        let err = start_export(&FailingBackend, params()).unwrap_err();
        match err {
            GridError::Backend(msg) => assert_eq!(msg, "quota exceeded"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
