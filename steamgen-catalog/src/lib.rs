//! Schema catalog for steamgen.
//!
//! Declares, per product area, which SteamKit schema files are compiled, where
//! each generated file lands in the go-steam protocol tree, and which
//! `protoc-gen-go` import mappings the compiler needs.
//!
//! The catalog is pure data: a `static` registry of [`SchemaGroup`] values.
//! See `SteamKit/Resources/Protobufs/steamclient/generate-base.bat` for the
//! upstream reference of the client file list.

use std::collections::BTreeSet;
use thiserror::Error;

/// First path component of every import mapping handed to the compiler.
///
/// `protoc-gen-go` places its output under `<go_out>/<import path>/`, so this
/// is also the root of the intermediate tree the generator leaves behind.
pub const IMPORT_ROOT: &str = "Protobufs";

/// Sibling schema that every group resolves inside its own subdirectory.
pub const STEAM_MESSAGES_SCHEMA: &str = "steammessages.proto";

/// One schema file and the output file it is generated into.
///
/// `target` is relative to the group's [`SchemaGroup::output_dir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMapping {
    pub schema: &'static str,
    pub target: &'static str,
}

/// Explicit `M<schema>=<import_path>` remap for the Go generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportMapping {
    pub schema: &'static str,
    pub import_path: &'static str,
}

/// A product area: one subdirectory of schemas and its output files.
#[derive(Debug, Clone)]
pub struct SchemaGroup {
    /// Short key (used for `--group` selection).
    pub name: &'static str,
    /// Subdirectory of the schema source base (e.g. `steam`, `dota2`).
    pub source_subdir: &'static str,
    /// Output directory, relative to the protocol root.
    pub output_dir: &'static str,
    /// Ordered schema → target mappings.
    pub files: &'static [FileMapping],
    /// Per-group remaps of cross-schema references.
    pub extra_mappings: &'static [ImportMapping],
}

/// A compiler directive resolved for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerOption {
    ImportMapping { schema: String, import_path: String },
}

impl CompilerOption {
    fn mapping(schema: &str, import_path: &str) -> Self {
        CompilerOption::ImportMapping {
            schema: schema.to_string(),
            import_path: import_path.to_string(),
        }
    }

    /// Render as a `protoc` argument.
    pub fn render(&self) -> String {
        match self {
            CompilerOption::ImportMapping {
                schema,
                import_path,
            } => format!("--go_opt=M{schema}={import_path}"),
        }
    }
}

/// Mappings shared by every group.
///
/// The descriptor and extension schemas keep their well-known paths so the
/// rewriter can recognise the descriptor dependency afterwards.
pub static GLOBAL_MAPPINGS: &[ImportMapping] = &[
    ImportMapping {
        schema: "google/protobuf/descriptor.proto",
        import_path: "google/protobuf/descriptor.proto",
    },
    ImportMapping {
        schema: "google/protobuf/valve_extensions.proto",
        import_path: "google/protobuf/valve_extensions.proto",
    },
    ImportMapping {
        schema: "steammessages_unified_base.steamworkssdk.proto",
        import_path: "steammessages_unified_base.steamworkssdk.proto",
    },
    ImportMapping {
        schema: "steammessages_steamlearn.steamworkssdk.proto",
        import_path: "steammessages_steamlearn.steamworkssdk.proto",
    },
];

const fn file(schema: &'static str, target: &'static str) -> FileMapping {
    FileMapping { schema, target }
}

static CLIENT_FILES: &[FileMapping] = &[
    file("steammessages_base.proto", "base.pb.go"),
    file("encrypted_app_ticket.proto", "app_ticket.pb.go"),
    file("offline_ticket.proto", "offline_ticket.pb.go"),
    file("steammessages_clientserver.proto", "client_server.pb.go"),
    file("steammessages_clientserver_2.proto", "client_server_2.pb.go"),
    file(
        "steammessages_clientserver_friends.proto",
        "client_server_friends.pb.go",
    ),
    file(
        "steammessages_clientserver_login.proto",
        "client_server_login.pb.go",
    ),
    file(
        "steammessages_sitelicenseclient.proto",
        "client_site_license.pb.go",
    ),
    file("content_manifest.proto", "content_manifest.pb.go"),
    file("enums.proto", "unified/enums.pb.go"),
    file("enums_productinfo.proto", "unified/enums_productinfo.pb.go"),
    file(
        "steammessages_unified_base.steamclient.proto",
        "unified/base.pb.go",
    ),
    file("steammessages_auth.steamclient.proto", "unified/auth.pb.go"),
    file(
        "steammessages_client_objects.proto",
        "unified/client_objects.pb.go",
    ),
    file("steammessages_cloud.steamclient.proto", "unified/cloud.pb.go"),
    file(
        "steammessages_credentials.steamclient.proto",
        "unified/credentials.pb.go",
    ),
    file(
        "steammessages_deviceauth.steamclient.proto",
        "unified/deviceauth.pb.go",
    ),
    file(
        "steammessages_gamenotifications.steamclient.proto",
        "unified/gamenotifications.pb.go",
    ),
    file(
        "steammessages_offline.steamclient.proto",
        "unified/offline.pb.go",
    ),
    file(
        "steammessages_parental.steamclient.proto",
        "unified/parental.pb.go",
    ),
    file(
        "steammessages_parental_objects.proto",
        "unified/parental_objects.pb.go",
    ),
    file(
        "steammessages_partnerapps.steamclient.proto",
        "unified/partnerapps.pb.go",
    ),
    file("steammessages_player.steamclient.proto", "unified/player.pb.go"),
    file(
        "steammessages_publishedfile.steamclient.proto",
        "unified/publishedfile.pb.go",
    ),
];

// Duplicates that also need to exist inside `unified`.
static CLIENT_UNIFIED_EXTRA_FILES: &[FileMapping] = &[
    file("steammessages_base.proto", "unified/mbase.pb.go"),
    file("offline_ticket.proto", "unified/offline_ticket.pb.go"),
];

static TF2_FILES: &[FileMapping] = &[
    file("base_gcmessages.proto", "base.pb.go"),
    file("econ_gcmessages.proto", "econ.pb.go"),
    file("gcsdk_gcmessages.proto", "gcsdk.pb.go"),
    file("tf_gcmessages.proto", "tf.pb.go"),
    file("gcsystemmsgs.proto", "system.pb.go"),
];

static DOTA2_FILES: &[FileMapping] = &[
    file("base_gcmessages.proto", "base.pb.go"),
    file("econ_shared_enums.proto", "econ_shared_enum.pb.go"),
    file("econ_gcmessages.proto", "econ.pb.go"),
    file("gcsdk_gcmessages.proto", "gcsdk.pb.go"),
    file("gcsystemmsgs.proto", "system.pb.go"),
    file("steammessages.proto", "steam.pb.go"),
    file("valveextensions.proto", "valveextensions.pb.go"),
];

static CSGO_FILES: &[FileMapping] = &[
    file("base_gcmessages.proto", "base.pb.go"),
    file("cstrike15_gcmessages.proto", "cstrike15gc.pb.go"),
    file("cstrike15_usermessages.proto", "cstrike15user.pb.go"),
    file("econ_gcmessages.proto", "econ.pb.go"),
    file("engine_gcmessages.proto", "enginegc.pb.go"),
    file("fatdemo.proto", "fatdemo.pb.go"),
    file("gcsdk_gcmessages.proto", "gcsdk.pb.go"),
    file("gcsystemmsgs.proto", "system.pb.go"),
    file("netmessages.proto", "net.pb.go"),
    file("network_connection.proto", "networkconnection.pb.go"),
    file("steammessages.proto", "steam.pb.go"),
    file("uifontfile_format.proto", "uifontfile.pb.go"),
    file("networkbasetypes.proto", "networkbasetypes.pb.go"),
];

/// Registry of every schema group, in generation order.
pub static CATALOG: &[SchemaGroup] = &[
    SchemaGroup {
        name: "steam",
        source_subdir: "steam",
        output_dir: "protobuf/steam",
        files: CLIENT_FILES,
        extra_mappings: &[],
    },
    SchemaGroup {
        name: "steam-unified-extra",
        source_subdir: "steam",
        output_dir: "protobuf/steam",
        files: CLIENT_UNIFIED_EXTRA_FILES,
        extra_mappings: &[],
    },
    SchemaGroup {
        name: "tf2",
        source_subdir: "tf2",
        output_dir: "protobuf/tf2",
        files: TF2_FILES,
        extra_mappings: &[],
    },
    SchemaGroup {
        name: "dota2",
        source_subdir: "dota2",
        output_dir: "protobuf/dota",
        files: DOTA2_FILES,
        // The default resolution assumes a flat namespace; the enums are
        // referenced from econ messages and must resolve inside dota2.
        extra_mappings: &[ImportMapping {
            schema: "econ_shared_enums.proto",
            import_path: "Protobufs/dota2/econ_shared_enums.proto",
        }],
    },
    SchemaGroup {
        name: "csgo",
        source_subdir: "csgo",
        output_dir: "protobuf/csgo",
        files: CSGO_FILES,
        extra_mappings: &[],
    },
];

impl SchemaGroup {
    /// Import path the compiler is told to use for a schema of this group.
    pub fn import_path(&self, schema: &str) -> String {
        format!("{}/{}/{}", IMPORT_ROOT, self.source_subdir, schema)
    }

    /// Resolve the compiler options for every job of this group.
    ///
    /// Order: global mappings, the `steammessages.proto` sibling, one mapping
    /// per schema in the group, then the group's extra remaps.
    pub fn resolve_options(&self) -> Vec<CompilerOption> {
        let mut opts: Vec<CompilerOption> = GLOBAL_MAPPINGS
            .iter()
            .map(|m| CompilerOption::mapping(m.schema, m.import_path))
            .collect();

        let mut seen = BTreeSet::new();
        seen.insert(STEAM_MESSAGES_SCHEMA);
        opts.push(CompilerOption::mapping(
            STEAM_MESSAGES_SCHEMA,
            &self.import_path(STEAM_MESSAGES_SCHEMA),
        ));

        for mapping in self.files {
            if seen.insert(mapping.schema) {
                opts.push(CompilerOption::mapping(
                    mapping.schema,
                    &self.import_path(mapping.schema),
                ));
            }
        }

        for extra in self.extra_mappings {
            opts.push(CompilerOption::mapping(extra.schema, extra.import_path));
        }

        opts
    }
}

/// Errors from catalog validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate target {target} (groups {first} and {second})")]
    DuplicateTarget {
        target: String,
        first: String,
        second: String,
    },

    #[error("unknown schema group '{name}' (available: {available})")]
    UnknownGroup { name: String, available: String },
}

/// Check that every target path is produced by exactly one mapping.
pub fn validate(groups: &[&SchemaGroup]) -> Result<(), CatalogError> {
    let mut owners: Vec<(String, &'static str)> = Vec::new();
    for group in groups {
        for mapping in group.files {
            let target = format!("{}/{}", group.output_dir, mapping.target);
            if let Some((_, first)) = owners.iter().find(|(t, _)| *t == target) {
                return Err(CatalogError::DuplicateTarget {
                    target,
                    first: first.to_string(),
                    second: group.name.to_string(),
                });
            }
            owners.push((target, group.name));
        }
    }
    Ok(())
}

/// Find a group by name (case-insensitive, `_` treated as `-`).
pub fn lookup_group(name: &str) -> Option<&'static SchemaGroup> {
    let normalized = name.to_lowercase().replace('_', "-");
    CATALOG.iter().find(|g| g.name == normalized)
}

/// List all group names in generation order.
pub fn group_names() -> Vec<&'static str> {
    CATALOG.iter().map(|g| g.name).collect()
}

/// Resolve a name selection into catalog groups; empty means all.
pub fn select_groups(names: &[String]) -> Result<Vec<&'static SchemaGroup>, CatalogError> {
    if names.is_empty() {
        return Ok(CATALOG.iter().collect());
    }

    let mut wanted = Vec::new();
    for name in names {
        let group = lookup_group(name).ok_or_else(|| CatalogError::UnknownGroup {
            name: name.clone(),
            available: group_names().join(", "),
        })?;
        wanted.push(group.name);
    }

    // Catalog order, not selection order.
    Ok(CATALOG.iter().filter(|g| wanted.contains(&g.name)).collect())
}
