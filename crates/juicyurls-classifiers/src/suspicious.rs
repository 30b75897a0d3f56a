//! Built-in suspicious pattern tables
//!
//! Used when the configuration does not supply its own lists. Matching is
//! ASCII case-insensitive, so entries are written in their common casing.

/// Sensitive words matched anywhere in the URL
pub const KEYWORDS: &[&str] = &[
    "admin", "administrator", "backup", "bak", "passwd", "password", "secret", "token",
    "apikey", "api_key", "access_key", "private_key", "credential", "auth", "login", "signin",
    "config", "debug", "dump", "database", "db_backup", "internal", "confidential", "staging",
    "test", "dev", "old", "root", "shell", "upload", "phpinfo", "swagger", "graphql", "jenkins",
    "jira", "console", "webhook", "oauth", "session", "redirect", "callback", "sqlmanager",
    "phpmyadmin", "adminer", "wp-config", "setup", "install", "export", "import",
];

/// File extensions matched at the very end of the URL
pub const EXTENSIONS: &[&str] = &[
    ".php", ".asp", ".aspx", ".jsp", ".inc", ".bak", ".zip", ".gz", ".tar", ".dat", ".json",
    ".env", ".conf", ".xml", ".yml", ".yaml", ".csv", ".log", ".txt", ".sql", ".db", ".backup",
    ".tar.gz", ".tar.bz2", ".7z", ".md", ".pem", ".key", ".crt", ".cer", ".p12", ".pfx", ".sh",
    ".pl", ".rb", ".exe", ".dll", ".msi", ".apk", ".ipa", ".html", ".js", ".css", ".scss",
    ".less", ".h", ".cpp", ".c", ".py", ".go", ".jar", ".war", ".ear", ".class", ".swf",
    ".jsonld", ".sqlite", ".db3", ".sqlite3", ".orig", ".swp", ".swo", ".lock", ".vbs", ".ps1",
    ".psm1", ".cmd", ".bat", ".config", ".ini", ".plist", ".dmg", ".iso", ".deb", ".rpm",
    ".bin", ".md5", ".sha256", ".cna", ".pub", ".gpg", ".asc", ".sql.gz", ".sql.bz2", ".sql.xz",
    ".sql.tgz", ".tar.xz", ".tar.zst", ".zipx", ".tar.lzma", ".lzo", ".bzip2", ".xz", ".lzma",
    ".tgz", ".gzip", ".tar.lz4",
];

/// Administrative, debug and storage path fragments
pub const PATHS: &[&str] = &[
    "/admin/", "/administrator/", "/wp-admin", "/wp-content/uploads", "/wp-includes",
    "/phpmyadmin", "/cpanel", "/manager/html", "/server-status", "/server-info",
    "/.well-known/", "/cgi-bin/", "/backup/", "/backups/", "/config/", "/conf/", "/private/",
    "/internal/", "/api/v1/", "/api/v2/", "/api/internal", "/actuator", "/actuator/env",
    "/debug/", "/console/", "/uploads/", "/files/", "/tmp/", "/temp/", "/logs/", "/log/",
    "/dump/", "/export/", "/storage/", "/vendor/", "/node_modules/", "/includes/", "/inc/",
    "/include/", "/old/", "/dev/", "/test/", "/staging/", "/swagger-ui", "/api-docs",
    "/graphiql", "/jmx-console", "/web-console", "/invoker/", "/solr/", "/elmah.axd",
    "/trace.axd", "/_profiler", "/telescope", "/horizon",
];

/// Dotfiles, dot-directories and tool state
pub const HIDDEN: &[&str] = &[
    ".env", ".git", ".gitignore", ".htpasswd", ".htaccess", ".idea", ".vscode", ".npmrc",
    ".DS_Store", ".dockerfile", ".travis.yml", ".yarn.lock", ".editorconfig", ".bashrc",
    ".bash_profile", ".zshrc", ".ssh", ".gitmodules", ".history", ".npm-debug.log",
    ".gitattributes", ".dockerignore", ".config", ".env.production", ".env.local",
    ".env.development", ".env.staging", ".env.testing", ".gitlab-ci.yml", ".gitconfig",
    ".credentials", ".heroku.yml", ".rails", ".credentials.yml.enc", ".config/database.yml",
    ".terraform", ".pylintrc", ".flake8", ".vimrc", ".bash_history", ".profile", ".zprofile",
    ".irssi", ".m2", ".gradle", ".clang-format", ".prettierrc", ".python-version",
    ".ruby-version", ".npm-global", ".yarnrc", ".envrc", ".docker-compose.yml", ".env.example",
    ".github", ".clang-tidy", ".terraformrc", ".composer.json", ".composer.lock",
    ".eslintrc.json", ".eslintignore", ".husky", ".config.json", ".prettierignore", ".babelrc",
    ".eslintcache", ".aws", ".kube", ".vagrant", ".circleci", ".ci", ".nx.json", ".next",
    ".nextjs", ".npm", ".yarn", ".public", ".system", ".archive", ".backup", ".log", ".temp",
    ".cache", ".tox", ".ci-configuration", ".local", ".sandbox", ".cargo", ".xcode",
    ".npm-cache", ".pnp.js", ".jest", ".nuxt", ".yarn-offline-mirror", ".firebase",
    ".firebase-debug.log", ".firebase.json", ".nuxt.config.js", ".babelrc.json",
    ".npm-shrinkwrap.json", ".vscode-test", ".pyenv", ".pyc", ".phantomjs", ".webpack",
    ".heroku", ".fastlane", ".apk", ".abp", ".tsconfig.json", ".railsrc", ".bash_logout",
    ".zsh_history", ".config/yarn/global", ".pouchdb", ".coverage", ".rbenv", ".terraform.d",
    ".vagrantfile", ".ci/test", ".deploy", ".osx", ".webconfig", ".cloud", ".codeship",
    ".git-credentials", ".subversion", ".svn", ".maven", ".codecov.yml", ".lintrc", ".bundle",
    ".gemfile.lock", ".bower.json", ".buildkite", ".sublime-project", ".sublime-workspace",
    ".jenkins", ".build", ".test", ".appcache", ".dist", ".releaserc", ".lerna.json",
    ".coveralls.yml", ".codemagic.yaml", ".watchmanconfig", ".goreleaser.yml", ".nyc_output",
    ".lintstagedrc", ".coveragerc", ".prettier.config.js", ".ember-cli.js", ".ci/local",
    ".deployments", ".drush", ".cloudfront", ".storybook", ".bit", ".agile", ".devcontainer",
    ".buildspec.yml", ".license-checker", ".eslintrc.js", ".fabric", ".boxen", ".ci-scripts",
    ".sqlitedb", ".docker-compose.override", ".lerna", ".kubernetes", ".testconfig",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_have_no_empty_or_duplicate_entries() {
        for table in [KEYWORDS, EXTENSIONS, PATHS, HIDDEN] {
            let mut seen = HashSet::new();
            for entry in table {
                assert!(!entry.trim().is_empty());
                assert!(seen.insert(entry.to_ascii_lowercase()), "duplicate entry {}", entry);
            }
        }
    }

    #[test]
    fn test_extensions_start_with_dot() {
        assert!(EXTENSIONS.iter().all(|e| e.starts_with('.')));
    }
}
