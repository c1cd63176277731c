//! Documentation about the plugins contained herein
//!
//! Generated by `make-docs`, do not edit by hand.
//!
//! - [check-nextcloud](#check-nextcloud)
//!
//! # check-nextcloud
//!
//! Cross platform, only requires HTTP(S) access to the Nextcloud instance and either a serverinfo token or an admin account.
//!
//! ```plain
//! $ check-nextcloud --help
//! check-nextcloud (part of nextcloud-plugins) 0.1.0
//! Check a Nextcloud instance through its serverinfo API.
//!
//! Authenticate with either a serverinfo token (-T) or a user and password (-u/-p). The token is used if both are
//! given.
//!
//! USAGE:
//!     check-nextcloud [FLAGS] [OPTIONS]
//!
//! FLAGS:
//!     -a, --apps       Also ask for app update information. Slower, implied by -P app_updates
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! OPTIONS:
//!     -c, --critical <critical>      Range to go critical outside of [default: ]
//!     -H, --host <host>              Hostname of the Nextcloud instance, e.g. cloud.example.com
//!     -P, --parameter <parameter>    Check this one metric instead of printing a summary. See below.
//!     -p, --password <password>      Password for --user [env: NC_PASSWORD]  [default: ]
//!     -s, --ssl <ssl>                Query over HTTPS: true or false [default: true]
//!     -T, --token <token>            Serverinfo token, sent as the NC-Token header [env: NC_TOKEN]
//!     -U, --uri <uri>                Path of the serverinfo API [default: /ocs/v2.php/apps/serverinfo/api/v1/info]
//!     -u, --user <user>              User to authenticate as, if no token is given [default: ]
//!     -w, --warning <warning>        Range to warn outside of [default: ]
//!
//! About Parameters:
//!
//!     Without -P this prints a summary of the instance and only warns when
//!     app updates are available. With -P, that one metric is checked against
//!     the -w and -c thresholds. The available parameters are:
//!
//!         version php_version freespace cpuload mem_free swap_free
//!         app_updates users users5m users1h users24h files shares
//!         shares_user shares_groups shares_link shares_fed db_size
//!
//! About Thresholds:
//!
//!     Thresholds use the Nagios range syntax and alert when the value is
//!     outside of the range:
//!
//!         - `x`     alert if the value is below 0 or above x
//!         - `x:`    alert if the value is below x
//!         - `~:x`   alert if the value is above x
//!         - `x:y`   alert if the value is below x or above y
//!         - `@x:y`  alert if the value is between x and y (inclusive)
//!
//!     For freespace, mem_free, swap_free and db_size the bounds may carry
//!     binary byte units: B kB MB GB TB PB EB ZB YB, e.g. `-w 10GB:`.
//!
//! Examples:
//!
//!     Warn when less than 10GB of disk space is free, critical under 2GB:
//!
//!         check-nextcloud -H cloud.example.com -T $TOKEN -P freespace -w 10GB: -c 2GB:
//!
//!     Go critical when more than 500 users were active in the last hour:
//!
//!         check-nextcloud -H cloud.example.com -u admin -p $PASS -P users1h -c '~:500'
//! ```
