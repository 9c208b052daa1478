//! The built-in `main` template.
//!
//! Rendered with `trim_blocks` and `lstrip_blocks` enabled, so block tags on
//! their own line leave no trace in the output. Every other section is pulled
//! in through `{% include %}` at its insertion point.
//!
//! The directives assume an nginx build with the uuid4, vts, cache purge and
//! lua modules loaded from `modules/*.conf`.

pub const DEFAULT_MAIN_TEMPLATE: &str = r#"# This file was generated by nginx-confgen.
# Do not modify this file, any change will be lost.

user {{ config.user or "nginx" }};
worker_processes {{ config.worker_processes or 1 }};

include modules/*.conf;

events {
    worker_connections {{ config.worker_connections or 1024 }};
}

{% include "root" %}

http {
    include       mime.types;
    default_type  application/octet-stream;
    server_tokens off;

    sendfile          on;
    keepalive_timeout 65;

{% if config.request_id_enabled %}
    uuid4 $request_id_uuid;
    map $http_x_request_id $request_id_final {
        default $request_id_uuid;
        "~."    $http_x_request_id;
    }

{% endif %}
    map $http_x_real_ip $real_ip_final {
        default $remote_addr;
        "~."    $http_x_real_ip;
    }

    map $http_x_forwarded_proto $forwarded_proto_final {
        default $scheme;
        "~."    $http_x_forwarded_proto;
    }

    map $http_x_forwarded_host $forwarded_host_final {
        default $host;
        "~."    $http_x_forwarded_host;
    }

    log_format confgen_combined
        '${remote_addr}\t${host}\t${request_method}\t${request_uri}\t${server_protocol}\t'
        '${http_referer}\t${http_x_mobile_group}\t'
        'Local:\t${status}\t*${connection}\t${body_bytes_sent}\t${request_time}\t'
        'Proxy:\t${upstream_addr}\t${upstream_status}\t${upstream_cache_status}\t'
        '${upstream_response_length}\t${upstream_response_time}\t${request_uri}\t'
{% if config.request_id_enabled %}
        'Agent:\t${http_user_agent}\t$request_id_final\t'
{% else %}
        'Agent:\t${http_user_agent}\t'
{% endif %}
        'Fwd:\t${http_x_forwarded_for}';

{% if config.syslog_enabled %}
    access_log syslog:server={{ config.syslog_server_address }},facility={{ config.syslog_facility or "local6" }},tag={{ config.syslog_tag or "confgen" }} confgen_combined;
    error_log syslog:server={{ config.syslog_server_address }},facility={{ config.syslog_facility or "local6" }},tag={{ config.syslog_tag or "confgen" }};
{% else %}
    access_log /dev/stdout confgen_combined;
    error_log  /dev/stderr;
{% endif %}

{% if config.cache_enabled %}
    proxy_cache_path {{ config.cache_path }}/nginx levels=1:2 keys_zone=confgen:{{ config.cache_zone_size }} inactive={{ config.cache_inactive }} max_size={{ config.cache_size }} loader_files={{ config.cache_loader_files }};
    proxy_temp_path  {{ config.cache_path }}/nginx_temp 1 2;

{% endif %}
    gzip                on;
    gzip_buffers        128 4k;
    gzip_comp_level     5;
    gzip_http_version   1.0;
    gzip_min_length     20;
    gzip_proxied        any;
    gzip_vary           on;
    gzip_types          application/atom+xml application/javascript
                        application/json application/rss+xml
                        application/xml application/x-javascript
                        text/css text/javascript text/plain text/xml;

{% if config.vts_enabled %}
    vhost_traffic_status_zone;

{% endif %}
{% if instance.host %}
    upstream {{ default_upstream }} {
        server {{ instance.host }};
{% if config.upstream_keepalive %}
        keepalive {{ config.upstream_keepalive }};
{% endif %}
    }

{% endif %}
{% for location in instance.locations if location.destination %}
    upstream {{ build_location_key("", location.path) }} {
        server {{ location.destination }};
{% if config.upstream_keepalive %}
        keepalive {{ config.upstream_keepalive }};
{% endif %}
    }

{% endfor %}
    init_by_lua_block {
{% include "lua-init" %}

    }

    init_worker_by_lua_block {
{% include "lua-worker-init" %}

    }

{% include "http" %}

    server {
        listen {{ manage_port() }};
{% if config.cache_enabled %}

        location ~ {{ purge_location_match() }} {
            proxy_cache_purge confgen $1$is_args$args;
        }
{% endif %}
{% if config.vts_enabled %}

        location {{ vts_location_match() }} {
            vhost_traffic_status_display;
            vhost_traffic_status_display_format prometheus;
        }
{% endif %}
    }

    server {
        listen 8080 default_server{% if config.http_listen_options %} {{ config.http_listen_options }}{% endif %};
{% set tls = default_certificate(instance.certificates) %}
{% if tls %}

        listen 8443 ssl{% if config.https_listen_options %} {{ config.https_listen_options }}{% endif %};

        ssl_certificate     certs/{{ tls.certificate_file }};
        ssl_certificate_key certs/{{ tls.key_file }};

        ssl_protocols TLSv1.2 TLSv1.3;
        ssl_ciphers 'ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305';
        ssl_prefer_server_ciphers on;
        ssl_session_cache shared:SSL:200m;
        ssl_session_timeout 1h;
{% endif %}

        port_in_redirect off;
{% if config.cache_enabled %}
        proxy_cache confgen;
        proxy_cache_use_stale error timeout updating invalid_header http_500 http_502 http_503 http_504;
        proxy_cache_lock on;
        proxy_cache_lock_age 60s;
        proxy_cache_lock_timeout 60s;
        proxy_cache_key $scheme$request_uri;
{% endif %}
        proxy_read_timeout 20s;
        proxy_connect_timeout 10s;
        proxy_send_timeout 20s;
        proxy_http_version 1.1;

        location = /_nginx_healthcheck {
            default_type "text/plain";
            return 200 "WORKING\n";
        }

{% for location in instance.locations %}
        location {{ location.path }} {
{% if location.destination %}
{% set key = build_location_key("", location.path) %}
{% if location.force_https %}
            if ($scheme = 'http') {
                return 301 https://$http_host$request_uri;
            }

{% endif %}
            proxy_set_header Host {{ location.destination }};
            proxy_set_header X-Real-IP $remote_addr;
            proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
            proxy_set_header X-Forwarded-Proto $scheme;
            proxy_set_header X-Forwarded-Host $host;
            proxy_set_header Connection "";
            proxy_http_version 1.1;
            proxy_pass http://{{ key }}/;
            proxy_redirect ~^http://{{ key }}(:\d+)?/(.*)$ {{ location.path }}$2;
{% elif location.content %}
            {{ location.content }}
{% endif %}
        }

{% endfor %}
{% if not has_root_path(instance.locations) %}
{% if instance.host %}
        location / {
            proxy_set_header Host {{ instance.host }};
            proxy_set_header X-Real-IP $remote_addr;
            proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
            proxy_set_header X-Forwarded-Proto $scheme;
            proxy_set_header X-Forwarded-Host $host;
            proxy_set_header Connection "";
            proxy_http_version 1.1;
            proxy_pass http://{{ default_upstream }}/;
            proxy_redirect ~^http://{{ default_upstream }}(:\d+)?/(.*)$ /$2;
        }
{% else %}
        location / {
            default_type "text/plain";
            return 200 "instance not bound yet\n";
        }
{% endif %}

{% endif %}
{% include "server" %}

    }
}
"#;
