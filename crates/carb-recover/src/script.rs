//! Template for the standalone restore shell script.

use crate::entries::RecoverEntry;
use std::path::Path;

/// Render the restore program for `entries`, whose blobs live under
/// `blob_dir` and whose parity sets (if any) live under `parity_dir`.
///
/// The script is POSIX `sh`, self-contained, and tolerant of a missing
/// `par2`-compatible binary on the recovery host (it warns once and
/// copies every blob raw instead of verifying/repairing).
#[must_use]
pub fn render_recovery_script(entries: &[RecoverEntry], blob_dir: &Path, parity_dir: &Path, codec_binary: &str) -> String {
    let mut data_lines = String::new();
    for e in entries {
        let start_dir_basename =
            e.start_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "restored".to_string());
        data_lines.push_str(&format!("{}\t{}\t{}\n", e.blob_id, start_dir_basename, e.rel_path));
    }

    format!(
        r#"#!/bin/sh
# carb restore program. Generated for one sealed run manifest; do not edit.
set -u

BLOB_DIR={blob_dir}
PARITY_DIR={parity_dir}
CODEC_BIN={codec_bin}
MODE=all
TARGET_DIR="${{CARB_RECOVER_TO_DIR:-}}"

for arg in "$@"; do
  case "$arg" in
    --damaged) MODE=damaged ;;
  esac
done

if [ -z "$TARGET_DIR" ]; then
  echo "carb-recover: CARB_RECOVER_TO_DIR must be set" >&2
  exit 64
fi

HAVE_CODEC=1
if ! command -v "$CODEC_BIN" >/dev/null 2>&1; then
  HAVE_CODEC=0
  echo "carb-recover: warning: $CODEC_BIN not found, falling back to raw copy for every entry" >&2
fi

count_verified_clean=0
count_repaired=0
count_no_parity_copied=0
count_failed=0
count_skipped_clean=0
count_skipped_no_parity=0

restore_one() {{
  blob_id="$1"
  start_base="$2"
  rel="$3"

  blob_path="$BLOB_DIR/$blob_id"
  parity_prefix="$PARITY_DIR/$(printf '%s' "$blob_id" | sed 's/\.data$//')"
  dest="$TARGET_DIR/$start_base/$rel"

  if [ ! -f "$blob_path" ]; then
    echo "carb-recover: missing blob for $rel ($blob_id)" >&2
    count_failed=$((count_failed + 1))
    return
  fi

  have_parity=0
  [ -f "$parity_prefix.par2" ] && have_parity=1

  status=clean
  if [ "$HAVE_CODEC" = "1" ] && [ "$have_parity" = "1" ]; then
    if "$CODEC_BIN" verify "$parity_prefix.par2" "$blob_path" >/dev/null 2>&1; then
      status=clean
    else
      if "$CODEC_BIN" repair "$parity_prefix.par2" "$blob_path" >/dev/null 2>&1; then
        status=repaired
      else
        status=damaged
      fi
    fi
  else
    status=no_parity
  fi

  case "$MODE:$status" in
    all:clean)
      mkdir -p "$(dirname "$dest")" && cp "$blob_path" "$dest" && count_verified_clean=$((count_verified_clean + 1))
      ;;
    all:repaired)
      mkdir -p "$(dirname "$dest")" && cp "$blob_path" "$dest" && count_repaired=$((count_repaired + 1))
      ;;
    all:no_parity)
      mkdir -p "$(dirname "$dest")" && cp "$blob_path" "$dest" && count_no_parity_copied=$((count_no_parity_copied + 1))
      ;;
    all:damaged)
      mkdir -p "$(dirname "$dest")" && cp "$blob_path" "$dest" && count_failed=$((count_failed + 1))
      ;;
    damaged:repaired)
      mkdir -p "$(dirname "$dest")" && cp "$blob_path" "$dest" && count_repaired=$((count_repaired + 1))
      ;;
    damaged:clean)
      count_skipped_clean=$((count_skipped_clean + 1))
      ;;
    damaged:no_parity)
      count_skipped_no_parity=$((count_skipped_no_parity + 1))
      ;;
    damaged:damaged)
      echo "carb-recover: repair failed for $rel ($blob_id)" >&2
      count_failed=$((count_failed + 1))
      ;;
  esac
}}

# Entry data: blob_id<TAB>start_dir_basename<TAB>relative_path
entries='{data_lines}'

printf '%s\n' "$entries" | while IFS="$(printf '\t')" read -r blob_id start_base rel; do
  [ -z "$blob_id" ] && continue
  restore_one "$blob_id" "$start_base" "$rel"
done

echo "carb-recover summary:"
echo "  verified-clean:      $count_verified_clean"
echo "  repaired:             $count_repaired"
echo "  no-parity-copied:     $count_no_parity_copied"
echo "  failed:               $count_failed"
echo "  skipped-clean:        $count_skipped_clean"
echo "  skipped-no-parity:    $count_skipped_no_parity"
"#,
        blob_dir = shell_quote(&blob_dir.display().to_string()),
        parity_dir = shell_quote(&parity_dir.display().to_string()),
        codec_bin = shell_quote(codec_binary),
        data_lines = data_lines,
    )
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
