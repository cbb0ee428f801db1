mod account_requests;
mod catalog;
mod health_check;
mod helpers;
mod orders;
mod profile;
mod registration;
