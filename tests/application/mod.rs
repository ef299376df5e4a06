mod info_service_test;
mod pipeline_request_test;
