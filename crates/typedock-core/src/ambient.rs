//! Ambient declaration synthesis
//!
//! Produces declaration text without touching the network: hand-authored
//! declarations for a small set of well-known libraries, and a permissive
//! `any`-typed fallback for everything else. Both are deterministic, pure
//! string synthesis and cannot fail.

/// Libraries with a hand-authored declaration available offline.
pub const SUPPORTED_LIBRARIES: &[&str] = &["lodash", "axios", "moment", "uuid", "classnames"];

const LODASH_DECLARATION: &str = r#"declare module 'lodash' {
  interface DebounceSettings {
    leading?: boolean;
    maxWait?: number;
    trailing?: boolean;
  }

  export function chunk<T>(array: T[], size?: number): T[][];
  export function compact<T>(array: (T | null | undefined | false | 0 | '')[]): T[];
  export function debounce<T extends (...args: any[]) => any>(
    func: T,
    wait?: number,
    options?: DebounceSettings
  ): T & { cancel(): void; flush(): ReturnType<T> };
  export function throttle<T extends (...args: any[]) => any>(func: T, wait?: number): T;
  export function cloneDeep<T>(value: T): T;
  export function isEqual(value: any, other: any): boolean;
  export function merge<T>(object: T, ...sources: any[]): T;
  export function pick<T, K extends keyof T>(object: T, ...paths: K[]): Pick<T, K>;
  export function omit<T, K extends keyof T>(object: T, ...paths: K[]): Omit<T, K>;
  export function uniq<T>(array: T[]): T[];
  export function groupBy<T>(collection: T[], iteratee: (value: T) => string): Record<string, T[]>;
  export function get(object: any, path: string | string[], defaultValue?: any): any;
  export function set<T>(object: T, path: string | string[], value: any): T;

  const _: {
    chunk: typeof chunk;
    compact: typeof compact;
    debounce: typeof debounce;
    throttle: typeof throttle;
    cloneDeep: typeof cloneDeep;
    isEqual: typeof isEqual;
    merge: typeof merge;
    pick: typeof pick;
    omit: typeof omit;
    uniq: typeof uniq;
    groupBy: typeof groupBy;
    get: typeof get;
    set: typeof set;
  };
  export default _;
}
"#;

const AXIOS_DECLARATION: &str = r#"declare module 'axios' {
  export interface AxiosRequestConfig {
    url?: string;
    method?: 'get' | 'post' | 'put' | 'patch' | 'delete' | 'head' | 'options';
    baseURL?: string;
    headers?: Record<string, string>;
    params?: any;
    data?: any;
    timeout?: number;
    responseType?: 'json' | 'text' | 'blob' | 'arraybuffer';
  }

  export interface AxiosResponse<T = any> {
    data: T;
    status: number;
    statusText: string;
    headers: Record<string, string>;
    config: AxiosRequestConfig;
  }

  export interface AxiosError<T = any> extends Error {
    config: AxiosRequestConfig;
    code?: string;
    response?: AxiosResponse<T>;
    isAxiosError: boolean;
  }

  export interface AxiosInstance {
    (config: AxiosRequestConfig): Promise<AxiosResponse>;
    get<T = any>(url: string, config?: AxiosRequestConfig): Promise<AxiosResponse<T>>;
    post<T = any>(url: string, data?: any, config?: AxiosRequestConfig): Promise<AxiosResponse<T>>;
    put<T = any>(url: string, data?: any, config?: AxiosRequestConfig): Promise<AxiosResponse<T>>;
    patch<T = any>(url: string, data?: any, config?: AxiosRequestConfig): Promise<AxiosResponse<T>>;
    delete<T = any>(url: string, config?: AxiosRequestConfig): Promise<AxiosResponse<T>>;
    create(config?: AxiosRequestConfig): AxiosInstance;
  }

  const axios: AxiosInstance;
  export default axios;
}
"#;

const MOMENT_DECLARATION: &str = r#"declare module 'moment' {
  export interface Moment {
    format(format?: string): string;
    add(amount: number, unit: string): Moment;
    subtract(amount: number, unit: string): Moment;
    startOf(unit: string): Moment;
    endOf(unit: string): Moment;
    isBefore(other: Moment | string | Date): boolean;
    isAfter(other: Moment | string | Date): boolean;
    isSame(other: Moment | string | Date, granularity?: string): boolean;
    diff(other: Moment | string | Date, unit?: string): number;
    valueOf(): number;
    toDate(): Date;
    toISOString(): string;
    fromNow(): string;
    unix(): number;
  }

  function moment(input?: string | number | Date | Moment, format?: string): Moment;
  namespace moment {
    function utc(input?: string | number | Date): Moment;
    function unix(timestamp: number): Moment;
    function duration(amount: number, unit?: string): { humanize(): string; asMilliseconds(): number };
    function isMoment(value: any): value is Moment;
  }

  export default moment;
}
"#;

const UUID_DECLARATION: &str = r#"declare module 'uuid' {
  export function v1(): string;
  export function v3(name: string, namespace: string | number[]): string;
  export function v4(): string;
  export function v5(name: string, namespace: string | number[]): string;
  export function validate(uuid: string): boolean;
  export function version(uuid: string): number;
  export const NIL: string;
}
"#;

const CLASSNAMES_DECLARATION: &str = r#"declare module 'classnames' {
  export type ClassValue =
    | string
    | number
    | null
    | undefined
    | Record<string, boolean | null | undefined>
    | ClassValue[];

  export default function classNames(...args: ClassValue[]): string;
}
"#;

/// Hand-authored declaration for a pre-registered library, if the module
/// name is one of [`SUPPORTED_LIBRARIES`].
pub fn builtin_declaration(name: &str) -> Option<&'static str> {
    match name {
        "lodash" => Some(LODASH_DECLARATION),
        "axios" => Some(AXIOS_DECLARATION),
        "moment" => Some(MOMENT_DECLARATION),
        "uuid" => Some(UUID_DECLARATION),
        "classnames" => Some(CLASSNAMES_DECLARATION),
        _ => None,
    }
}

/// Synthesize the permissive fallback declaration for an unknown module.
///
/// The module is declared as an opaque `any`-typed value: importing it
/// produces no type errors and no specific suggestions, only confirmation
/// that the module exists.
pub fn synthesize_fallback(name: &str) -> String {
    format!(
        "declare module '{name}' {{\n  const content: any;\n  export = content;\n}}\n"
    )
}
