use super::test_helpers::*;
use super::*;
use crate::platform::Platform;
use crate::types::{DownloadRequest, JobState, OutputKind, ResultStatus};

mod submit;

const TIKTOK_URL: &str = "https://www.tiktok.com/@someone/video/7301234567890";
const TIKTOK_FAIL_URL: &str = "https://www.tiktok.com/@someone/video/fail";
