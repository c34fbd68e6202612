pub mod disk_service;
