pub mod gallery_service;
pub mod storage_service;
