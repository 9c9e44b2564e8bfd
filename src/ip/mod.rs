mod external;

pub use external::{extract_ipv4, get_external_ip, EXTERNAL_IP_CHECK_URL};
