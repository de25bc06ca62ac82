mod anonymize_page;
mod device_forwarding;
