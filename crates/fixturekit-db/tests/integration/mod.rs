mod applier;
mod datasource;
mod inspector;
mod schema;
