pub mod host_message;
