mod common;

mod adapter_binding;
mod config_loading;
