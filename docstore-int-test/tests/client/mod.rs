mod client_test;
mod connectivity_test;
