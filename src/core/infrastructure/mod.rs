pub mod api_client;
pub mod xml_document;
pub mod xmlrpc;
